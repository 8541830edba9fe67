//! Fixed feature schema and coercion of loosely-typed student records into model input.

mod student;

pub use student::StudentFeatures;

use serde::{Deserialize, Serialize};

/// Number of features the classifier was trained on.
pub const FEATURE_COUNT: usize = 11;

/// Training-time column order. The model input is laid out exactly in this order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "LopID",
    "TyLeChuyenCan_NuaDau",
    "SoBuoiVang_NuaDau",
    "SoBuoiVangDau",
    "DiemGiuaKy",
    "KetQuaGiuaKy",
    "SoNgayDangKySom",
    "TuoiHocVien",
    "KhoaHocID",
    "GiangVienID",
    "DiaDiemID",
];

/// Fixed-size feature vector for model input, in [`FEATURE_COLUMNS`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Value of a named column, if the name is part of the schema.
    pub fn get(&self, column: &str) -> Option<f32> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.values[i])
    }
}

/// Schema column names as owned strings (for comparison against model metadata).
pub fn feature_columns() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
}
