//! CLI argument parsing and exit-code tests.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  { "id": "mb-am5", "name": "B650 Board", "price": 170, "predicted_rating": 4.5,
    "features": { "motherboard": { "socket": "AM5", "ram_type": "DDR5", "ram_slots": 4, "m2_slots": 2 } } },
  { "id": "cpu-r5", "name": "AMD Ryzen 5 7600", "price": 210, "predicted_rating": 4.6,
    "features": { "processor": { "socket": "AM5", "tdp_watts": 65, "performance_tier": "mid" } } },
  { "id": "ram-32", "name": "DDR5 32GB", "price": 110, "predicted_rating": 4.5,
    "features": { "memory": { "ram_type": "DDR5", "capacity_gb": 32 } } },
  { "id": "gpu-mid", "name": "Mid GPU", "price": 480, "predicted_rating": 4.6,
    "features": { "graphics": { "length_mm": 280, "tdp_watts": 200, "performance_tier": "high" } } },
  { "id": "ssd-1tb", "name": "NVMe 1TB", "price": 75, "predicted_rating": 4.5,
    "features": { "storage": { "storage_type": "NVME", "capacity_gb": 1000 } } },
  { "id": "psu-650", "name": "650W Gold", "price": 85, "predicted_rating": 4.4,
    "features": { "power_supply": { "wattage": 650 } } },
  { "id": "case-mid", "name": "Mid Tower", "price": 80, "predicted_rating": 4.3,
    "features": { "case": { "max_gpu_length_mm": 340 } } }
]"#;

fn rigforge() -> Command {
    let mut cmd = Command::cargo_bin("rigforge").expect("rigforge binary");
    cmd.env_remove("RIGFORGE_CATALOG").env_remove("RUST_LOG");
    cmd
}

fn create_temp_shop() -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    fs::write(td.path().join("catalog.json"), CATALOG).expect("write catalog");
    td
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("json")
}

#[test]
fn test_build_from_flags_writes_artifacts() {
    let temp = create_temp_shop();

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "catalog.json", "--budget", "1600"])
        .args(["--use-case", "gaming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gamer_mid"))
        .stdout(predicate::str::contains("7 selected, 0 skipped, verdict pass"));

    let out = temp.path().join("artifacts").join("rigforge");
    let build = read_json(&out.join("build.json"));
    assert_eq!(build["schema"], "rigforge.build.v1");
    assert_eq!(build["configuration"]["graphics"]["item"]["id"], "gpu-mid");
    assert!(out.join("build.md").exists());
    assert_eq!(read_json(&out.join("report.json"))["verdict"]["status"], "pass");
}

#[test]
fn test_build_from_intent_file_with_out_dir() {
    let temp = create_temp_shop();
    fs::write(
        temp.path().join("intent.json"),
        r#"{ "budget": 1600, "use_cases": ["gaming"], "suggested_profile_id": "custom" }"#,
    )
    .expect("write intent");

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "catalog.json", "--intent", "intent.json"])
        .args(["--out-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom"));

    assert!(temp.path().join("out").join("build.json").exists());
}

#[test]
fn test_build_catalog_from_env() {
    let temp = create_temp_shop();

    rigforge()
        .current_dir(temp.path())
        .env("RIGFORGE_CATALOG", "catalog.json")
        .args(["build", "--budget", "1600", "--use-case", "gaming"])
        .assert()
        .success();
}

#[test]
fn test_build_intent_conflicts_with_budget() {
    let temp = create_temp_shop();

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "catalog.json", "--intent", "intent.json"])
        .args(["--budget", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_build_requires_budget_or_intent() {
    let temp = create_temp_shop();

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "catalog.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("either --intent or --budget is required"));
}

#[test]
fn test_build_missing_catalog_is_tool_error() {
    let temp = create_temp_shop();

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "missing.json", "--budget", "1600"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("load catalog"));
}

#[test]
fn test_over_budget_is_advisory_by_default() {
    let temp = create_temp_shop();

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "catalog.json", "--budget", "500"])
        .args(["--use-case", "gaming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verdict warn"));
}

#[test]
fn test_over_budget_strict_is_policy_block() {
    let temp = create_temp_shop();

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "catalog.json", "--budget", "500"])
        .args(["--use-case", "gaming", "--strict"])
        .assert()
        .code(2);

    // Artifacts are still written for a blocked build.
    assert!(temp.path().join("artifacts/rigforge/report.json").exists());
}

#[test]
fn test_strict_from_config_file() {
    let temp = create_temp_shop();
    fs::write(temp.path().join("rigforge.toml"), "[run]\nstrict = true\n").expect("write config");

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "catalog.json", "--budget", "500"])
        .args(["--use-case", "gaming"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_config_file_is_tool_error() {
    let temp = create_temp_shop();
    fs::write(temp.path().join("rigforge.toml"), "[run]\nstrict = maybe\n").expect("write config");

    rigforge()
        .current_dir(temp.path())
        .args(["build", "--catalog", "catalog.json", "--budget", "1600"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("rigforge.toml"));
}

#[test]
fn test_allocate_json_office_low_budget() {
    let output = rigforge()
        .args(["allocate", "--budget", "900", "--use-case", "office", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(doc["policy"], "office");
    assert_eq!(doc["tier"], "low");
    assert_eq!(doc["profile_id"], "office_budget");
    let entries = doc["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 6);
    assert!(entries.iter().all(|e| e["category"] != "graphics"));
    assert_eq!(doc["order"][0], "motherboard");
}

#[test]
fn test_allocate_text_shows_order() {
    rigforge()
        .args(["allocate", "--budget", "2000", "--use-case", "gaming"])
        .args(["--priority", "gpu"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Resolution order: motherboard -> processor -> memory -> graphics",
        ));
}

#[test]
fn test_allocate_threshold_override_changes_tier() {
    let output = rigforge()
        .args(["allocate", "--budget", "2000", "--use-case", "gaming"])
        .args(["--high-budget-above", "1500", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(doc["tier"], "high");
}

#[test]
fn test_allocate_rejects_inverted_thresholds() {
    rigforge()
        .args(["allocate", "--budget", "2000"])
        .args(["--low-budget-below", "5000", "--high-budget-above", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not exceed"));
}

#[test]
fn test_allocate_rejects_negative_budget() {
    rigforge()
        .args(["allocate", "--budget=-10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("budget must be a positive number"));
}

#[test]
fn test_unknown_use_case_is_rejected() {
    rigforge()
        .args(["allocate", "--budget", "1000", "--use-case", "mining"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown use case"));
}

#[test]
fn test_unknown_priority_is_rejected() {
    rigforge()
        .args(["allocate", "--budget", "1000", "--priority", "fan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn test_list_policies_text_format() {
    rigforge()
        .arg("list-policies")
        .assert()
        .success()
        .stdout(predicate::str::contains("creative"))
        .stdout(predicate::str::contains("development"));
}

#[test]
fn test_list_policies_json_format() {
    let output = rigforge()
        .args(["list-policies", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(doc.as_array().map(Vec::len), Some(4));
    assert_eq!(doc[0]["key"], "creative");
}

#[test]
fn test_list_policies_invalid_format() {
    rigforge()
        .args(["list-policies", "--format", "yaml"])
        .assert()
        .failure();
}

#[test]
fn test_explain_gaming_shows_shares() {
    rigforge()
        .args(["explain", "gaming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("POLICY: Gaming"))
        .stdout(predicate::str::contains("graphics"))
        .stdout(predicate::str::contains("42%"));
}

#[test]
fn test_explain_creative_shows_gaming_variant() {
    rigforge()
        .args(["explain", "video-editing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BUDGET SHARES (with gaming)"));
}

#[test]
fn test_explain_unknown_policy() {
    rigforge()
        .args(["explain", "mining"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown policy"));
}
