use std::process::{Command, Output};

fn waypoint_defence(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_waypoint-defence"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("failed to run the waypoint-defence binary")
}

#[test]
fn help_lists_level_and_placement_options() {
    let output = waypoint_defence(&["--help"]);
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("--level"));
    assert!(help.contains("--place"));
    assert!(help.contains("KIND@COLUMN,ROW"));
}

#[test]
fn json_summary_reports_prebuilt_turrets() {
    let output = waypoint_defence(&["--max-ticks", "0", "--json", "--place", "shooter@0,0"]);
    assert!(output.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout holds the JSON summary");
    assert_eq!(summary["phase"], "Playing");
    assert_eq!(summary["ticks"], 0);
    assert_eq!(summary["turrets"], 1);
    assert_eq!(summary["gold"], 300);
}

#[test]
fn malformed_placement_is_rejected() {
    let output = waypoint_defence(&["--place", "laser@1,1"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown turret kind `laser`"));
}
