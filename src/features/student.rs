//! Student record: JSON mapping → 11 named features, each defaulting to zero.

use super::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::error::{json_kind, PreprocessError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StudentFeatures {
    #[serde(rename = "LopID")]
    pub class_id: f32,
    /// Attendance rate over the first half of the course (0.0–1.0)
    #[serde(rename = "TyLeChuyenCan_NuaDau")]
    pub attendance_rate_first_half: f32,
    #[serde(rename = "SoBuoiVang_NuaDau")]
    pub absences_first_half: f32,
    /// Absences among the opening sessions
    #[serde(rename = "SoBuoiVangDau")]
    pub early_absences: f32,
    #[serde(rename = "DiemGiuaKy")]
    pub midterm_score: f32,
    /// 1 = passed, 0 = failed
    #[serde(rename = "KetQuaGiuaKy")]
    pub midterm_result: f32,
    #[serde(rename = "SoNgayDangKySom")]
    pub early_registration_days: f32,
    #[serde(rename = "TuoiHocVien")]
    pub age: f32,
    #[serde(rename = "KhoaHocID")]
    pub course_id: f32,
    #[serde(rename = "GiangVienID")]
    pub instructor_id: f32,
    #[serde(rename = "DiaDiemID")]
    pub location_id: f32,
}

impl StudentFeatures {
    /// Coerce a loosely-typed JSON value into features.
    ///
    /// Absent and null fields become 0, unknown keys are ignored. Numbers are taken as-is,
    /// booleans map to 1/0 and numeric strings are parsed; anything else is rejected.
    pub fn from_json(data: &Value) -> Result<Self, PreprocessError> {
        let map = data
            .as_object()
            .ok_or_else(|| PreprocessError::NotAnObject(json_kind(data)))?;
        Self::from_map(map)
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, PreprocessError> {
        let mut values = [0.0f32; FEATURE_COUNT];
        for (slot, column) in values.iter_mut().zip(FEATURE_COLUMNS) {
            *slot = coerce(column, map.get(column))?;
        }
        Ok(Self::from_vector(&FeatureVector { values }))
    }

    pub fn from_vector(fv: &FeatureVector) -> Self {
        let [class_id, attendance_rate_first_half, absences_first_half, early_absences, midterm_score, midterm_result, early_registration_days, age, course_id, instructor_id, location_id] =
            fv.values;
        Self {
            class_id,
            attendance_rate_first_half,
            absences_first_half,
            early_absences,
            midterm_score,
            midterm_result,
            early_registration_days,
            age,
            course_id,
            instructor_id,
            location_id,
        }
    }

    /// Encode in training-time column order.
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector {
            values: [
                self.class_id,
                self.attendance_rate_first_half,
                self.absences_first_half,
                self.early_absences,
                self.midterm_score,
                self.midterm_result,
                self.early_registration_days,
                self.age,
                self.course_id,
                self.instructor_id,
                self.location_id,
            ],
        }
    }
}

fn coerce(field: &'static str, value: Option<&Value>) -> Result<f32, PreprocessError> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| PreprocessError::NonNumeric {
            field,
            value: n.to_string(),
        })?,
        Some(Value::String(s)) => {
            s.trim()
                .parse::<f64>()
                .map_err(|_| PreprocessError::NonNumeric {
                    field,
                    value: format!("{:?}", s),
                })?
        }
        Some(other) => {
            return Err(PreprocessError::NonNumeric {
                field,
                value: other.to_string(),
            })
        }
    };
    let v = raw as f32;
    if !v.is_finite() {
        return Err(PreprocessError::NonFinite { field });
    }
    Ok(v)
}
