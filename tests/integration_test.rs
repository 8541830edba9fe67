//! Integration test: request parsing, dispatch, result shapes, missing-model behaviour, and the
//! binary's stdin/stdout contract.

use dropout_predictor::{
    config::{ModelConfig, ServiceConfig, CONFIG_PATH_ENV},
    error::ModelError,
    features::FeatureVector,
    protocol::handle_request,
    service::PredictionService,
    ProbabilityClassifier,
};
use serde_json::{json, Value};
use std::io::Write;
use std::process::{Command, Stdio};

/// Logistic score over attendance, midterm score and early absences.
struct LogisticStub;

impl ProbabilityClassifier for LogisticStub {
    fn predict_proba(&mut self, fv: &FeatureVector) -> Result<[f64; 2], ModelError> {
        let attendance = f64::from(fv.values[1]);
        let midterm = f64::from(fv.values[4]);
        let early_absences = f64::from(fv.values[3]);
        let z = 1.5 - 3.0 * attendance - 0.2 * midterm + 0.8 * early_absences;
        let p = 1.0 / (1.0 + (-z).exp());
        Ok([1.0 - p, p])
    }
}

/// Fixed vote fraction, as a forest of 32 trees would produce.
struct VoteFractionStub(f32);

impl ProbabilityClassifier for VoteFractionStub {
    fn predict_proba(&mut self, _: &FeatureVector) -> Result<[f64; 2], ModelError> {
        let p = f64::from(self.0);
        Ok([1.0 - p, p])
    }
}

fn loaded_service() -> PredictionService {
    PredictionService::with_classifier(ServiceConfig::default(), Box::new(LogisticStub))
}

fn missing_model_service() -> (tempfile::TempDir, PredictionService) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        model: ModelConfig {
            model_path: Some(dir.path().join("model_dropout_tuned.onnx")),
            ..ModelConfig::default()
        },
        ..ServiceConfig::default()
    };
    (dir, PredictionService::new(config))
}

fn respond(service: &mut PredictionService, input: &str) -> Value {
    let text = handle_request(service, input).render().unwrap();
    serde_json::from_str(&text).unwrap()
}

fn assert_well_formed(result: &Value) {
    let risk = result["dropout_risk"].as_f64().unwrap();
    let pct = result["dropout_percentage"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&risk));
    // two decimals, within half a hundredth of the exact percentage
    assert!(((pct * 100.0).round() - pct * 100.0).abs() < 1e-6);
    assert!((pct - risk * 100.0).abs() <= 0.005 + 1e-9);
    let expected = if risk > 0.5 { "high_risk" } else { "low_risk" };
    assert_eq!(result["status"], expected);
    assert!(result.get("error").is_none());
}

#[test]
fn single_prediction_with_partial_fields() {
    let mut s = loaded_service();
    let out = respond(
        &mut s,
        r#"{"operation":"predict_single","data":{"LopID":1,"TyLeChuyenCan_NuaDau":0.9,"DiemGiuaKy":8.5}}"#,
    );
    assert_well_formed(&out);
    assert_eq!(out["status"], "low_risk");
}

#[test]
fn batch_of_empty_records() {
    let mut s = loaded_service();
    let out = respond(&mut s, r#"{"operation":"predict_batch","data":[{},{}]}"#);
    let items = out.as_array().unwrap();
    assert_eq!(items.len(), 2);
    for item in items {
        assert_well_formed(item);
        assert_eq!(item["status"], "high_risk");
    }
    assert_eq!(items[0], items[1]);
}

#[test]
fn batch_preserves_order_and_isolates_failures() {
    let mut s = loaded_service();
    let out = respond(
        &mut s,
        r#"{"operation":"predict_batch","data":[
            {"TyLeChuyenCan_NuaDau": 1.0, "DiemGiuaKy": 9},
            {"DiemGiuaKy": "not a score"},
            {"SoBuoiVangDau": 3, "Ghi chu": "extra"},
            {"TyLeChuyenCan_NuaDau": null}
        ]}"#,
    );
    let items = out.as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["status"], "low_risk");
    assert_eq!(items[1]["status"], "unknown");
    assert_eq!(items[1]["dropout_risk"], 0.0);
    assert!(items[1]["error"].as_str().unwrap().starts_with("Prediction failed:"));
    assert_eq!(items[2]["status"], "high_risk");
    assert_well_formed(&items[3]);
}

#[test]
fn vote_fraction_percentage_rounds_half_to_even() {
    let mut s = PredictionService::with_classifier(
        ServiceConfig::default(),
        Box::new(VoteFractionStub(1.0 / 32.0)),
    );
    let out = respond(&mut s, r#"{"operation":"predict_single","data":{}}"#);
    assert_eq!(out["dropout_percentage"], 3.12);
    assert_eq!(out["status"], "low_risk");
    assert_well_formed(&out);
}

#[test]
fn unknown_operation() {
    let mut s = loaded_service();
    let text = handle_request(&mut s, r#"{"operation":"unknown_op","data":{}}"#)
        .render()
        .unwrap();
    assert_eq!(text, r#"{"error":"Unknown operation: unknown_op"}"#);
}

#[test]
fn non_string_operation_is_unknown() {
    let mut s = loaded_service();
    let text = handle_request(&mut s, r#"{"operation":7,"data":{}}"#)
        .render()
        .unwrap();
    assert_eq!(text, r#"{"error":"Unknown operation: 7"}"#);
    let text = handle_request(&mut s, r#"{"operation":null}"#).render().unwrap();
    assert_eq!(text, r#"{"error":"Unknown operation: null"}"#);
}

#[test]
fn explicit_null_data() {
    let mut s = loaded_service();
    let out = respond(&mut s, r#"{"operation":"predict_batch","data":null}"#);
    assert!(out["error"].as_str().unwrap().starts_with("Service error: "));

    let out = respond(&mut s, r#"{"operation":"predict_batch"}"#);
    assert_eq!(out, json!([]));

    let out = respond(&mut s, r#"{"operation":"predict_single","data":null}"#);
    assert_eq!(out["status"], "unknown");
    assert!(out["error"].as_str().unwrap().starts_with("Prediction failed:"));
}

#[test]
fn malformed_request_is_service_error() {
    let mut s = loaded_service();
    let out = respond(&mut s, "{\"operation\": ");
    assert!(out["error"].as_str().unwrap().starts_with("Service error: "));

    let out = respond(&mut s, r#"{"operation":"predict_batch","data":{"LopID":1}}"#);
    assert!(out["error"].as_str().unwrap().starts_with("Service error: "));
}

#[test]
fn missing_model_single_and_batch() {
    let (_dir, mut s) = missing_model_service();
    assert!(!s.load_model());

    let out = respond(&mut s, r#"{"operation":"predict_single","data":{"LopID":1}}"#);
    assert_eq!(out, json!({"error": "Model not loaded"}));

    let out = respond(&mut s, r#"{"operation":"predict_batch","data":[{},{"LopID":2}]}"#);
    assert_eq!(
        out,
        json!([{"error": "Model not loaded"}, {"error": "Model not loaded"}])
    );
}

#[test]
fn repeated_requests_are_identical() {
    let mut s = loaded_service();
    let req = r#"{"data":{"TyLeChuyenCan_NuaDau":0.55,"SoBuoiVangDau":1,"DiemGiuaKy":6}}"#;
    assert_eq!(respond(&mut s, req), respond(&mut s, req));
}

#[test]
fn binary_reads_stdin_and_writes_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("dropout-predictor.json");
    let config = json!({"model": {"model_path": dir.path().join("absent.onnx")}});
    std::fs::write(&config_path, config.to_string()).unwrap();

    let run = |input: &str| -> String {
        let mut child = Command::new(env!("CARGO_BIN_EXE_dropout-predictor"))
            .env(CONFIG_PATH_ENV, &config_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        let out = child.wait_with_output().unwrap();
        assert!(out.status.success());
        String::from_utf8(out.stdout).unwrap()
    };

    assert_eq!(
        run(r#"{"operation":"unknown_op","data":{}}"#),
        "{\"error\":\"Unknown operation: unknown_op\"}\n"
    );
    assert_eq!(
        run(r#"{"operation":"predict_single","data":{}}"#),
        "{\n  \"error\": \"Model not loaded\"\n}\n"
    );
    assert!(run("garbage").starts_with("{\"error\":\"Service error: "));
}

#[test]
fn binary_reports_invalid_config_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("dropout-predictor.json");
    std::fs::write(&config_path, "{ not json").unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_dropout-predictor"))
        .env(CONFIG_PATH_ENV, &config_path)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{"operation":"unknown_op"}"#)
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "{\"error\":\"Unknown operation: unknown_op\"}\n"
    );
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("invalid config"), "stderr: {}", stderr);
}
