use std::process::Command;

fn temp_path(label: &str, ext: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "tabletop-cli-{label}-{}.{ext}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_tabletop-tester");
    let output_path = temp_path("list", "txt");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("ransomware-001"));
}

#[test]
fn cli_playthroughs_pass_with_markdown_report() {
    let exe = env!("CARGO_BIN_EXE_tabletop-tester");
    let output_path = temp_path("run", "md");
    let status = Command::new(exe)
        .args([
            "--report",
            "markdown",
            "--iterations",
            "2",
            "--seeds",
            "1,2",
            "--roles",
            "CISO,DFIR",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("# Tabletop Scenario Test Results"));
    assert!(content.contains("[timeout]"));
}

#[test]
fn cli_rejected_file_fails_the_run() {
    let exe = env!("CARGO_BIN_EXE_tabletop-tester");
    let bad = temp_path("bad", "json");
    std::fs::write(&bad, r#"{ "meta": {} }"#).expect("write scenario");
    let output_path = temp_path("validate", "json");
    let status = Command::new(exe)
        .args(["--validate-only", "--report", "json", "--validate"])
        .arg(&bad)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert_eq!(status.code(), Some(1));
    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(value["files"][0]["accepted"], false);
    assert!(
        value["files"][0]["errors"]
            .as_array()
            .is_some_and(|errors| !errors.is_empty())
    );
}

#[test]
fn cli_rejects_invalid_policy() {
    let exe = env!("CARGO_BIN_EXE_tabletop-tester");
    let policy = temp_path("policy", "json");
    std::fs::write(&policy, r#"{ "session_length": 0 }"#).expect("write policy");
    let output = Command::new(exe)
        .args(["--iterations", "1", "--policy"])
        .arg(&policy)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid policy"));
}
