use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "wreckroad-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_modes_writes_output() {
    let exe = env!("CARGO_BIN_EXE_wreckroad-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-modes", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available modes"));
    assert!(content.contains("walk"));
}

#[test]
fn cli_audit_writes_a_passing_json_report() {
    let exe = env!("CARGO_BIN_EXE_wreckroad-tester");
    let output_path = temp_path("audit");
    let output = Command::new(exe)
        .args([
            "--mode",
            "audit",
            "--report",
            "json",
            "--seeds",
            "1,WR-PISTON42",
            "--iterations",
            "2",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["mode"], "audit");
    assert_eq!(report["summary"]["failed"], 0);
    assert_eq!(report["summary"]["maps"], 12);
    let records = report["records"].as_array().expect("records");
    let mut coded = 0;
    for record in records {
        if let Some(code) = record["code"].as_str() {
            coded += 1;
            assert_eq!(wreckroad_game::decode_to_seed(code), record["seed"].as_u64());
        }
    }
    assert_eq!(coded, 3);
}

#[test]
fn cli_auto_walk_renders_markdown() {
    let exe = env!("CARGO_BIN_EXE_wreckroad-tester");
    let output_path = temp_path("walk");
    let output = Command::new(exe)
        .args([
            "--mode",
            "walk",
            "--auto",
            "--report",
            "markdown",
            "--seeds",
            "9",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("# Wreckroad Map Tester Results"));
    assert!(content.contains("BossReached"));
}

#[test]
fn cli_rejects_unknown_parts() {
    let exe = env!("CARGO_BIN_EXE_wreckroad-tester");
    let output = Command::new(exe)
        .args(["--mode", "power", "--parts", "hovercraft"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("hovercraft"));
}
