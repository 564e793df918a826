#![cfg(feature = "cli")]

mod common;

use assert_cmd::Command;
use common::SMALL_MSRCP;
use predicates::str::contains as str_contains;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

fn instance_file() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("small.msrcp");
    fs::write(&path, SMALL_MSRCP).expect("write instance");
    let path = path.to_string_lossy().to_string();
    (dir, path)
}

#[test]
fn cli_loads_and_describes_an_instance() {
    let (_dir, path) = instance_file();
    run_cli(&format!("load {path}\ninfo\nbounds\nquit\n"))
        .success()
        .stdout(str_contains("Loaded 'small': 4 activities, 3 resources, 2 skills"))
        .stdout(str_contains("Level deadline:    12"))
        .stdout(str_contains("early_start"));
}

#[test]
fn cli_runs_a_rule_and_verifies_it() {
    let (_dir, path) = instance_file();
    run_cli(&format!("load {path}\nrun EFT\nverify\nquit\n"))
        .success()
        .stdout(str_contains("Rule EFT: complete, makespan 7"))
        .stdout(str_contains("Schedule OK: no violations."));
}

#[test]
fn cli_rejects_unknown_rules() {
    let (_dir, path) = instance_file();
    run_cli(&format!("load {path}\nrun FIFO\nhint LFT,FIFO\nquit\n"))
        .success()
        .stdout(str_contains("unknown priority rule 'FIFO'"));
}

#[test]
fn cli_requires_an_instance() {
    run_cli("run EFT\nquit\n")
        .success()
        .stdout(str_contains("No instance loaded."));
}

#[test]
fn cli_runall_follows_the_hint_and_saves_outputs() {
    let (dir, path) = instance_file();
    let schedule_csv = dir.path().join("schedule.csv");
    let report_json = dir.path().join("report.json");
    let script = format!(
        "load {path}\nhint stfd\nruntime\nrunall\nsave csv {}\nreport json {}\nquit\n",
        schedule_csv.display(),
        report_json.display()
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Search order: STFD,HRPW*,LST"));
    assert!(output.contains("Unknown command."));
    assert!(output.contains("Best rule:"));
    assert!(
        output.find("| STFD").unwrap() < output.find("| HRPW*").unwrap(),
        "hinted rule should be evaluated first:\n{output}"
    );

    let csv = fs::read_to_string(&schedule_csv).expect("schedule csv");
    assert!(csv.starts_with("activity,start,end,resources"));
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_json).expect("report json"))
            .expect("valid json");
    assert_eq!(report["runs"].as_array().map(|runs| runs.len()), Some(10));
}

#[test]
fn cli_config_set_limits_the_ladder() {
    let (_dir, path) = instance_file();
    let script = format!(
        "config set {{\"scheduler\": {{\"max_relaxation\": \"near_miss\"}}}}\nconfig show\nconfig set {{\"scheduler\": {{\"iteration_ceiling\": 0}}}}\nload {path}\nrun LFT\nquit\n"
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Config updated."))
        .stdout(str_contains("\"max_relaxation\": \"near_miss\""))
        .stdout(str_contains("iteration_ceiling must be positive"))
        .stdout(str_contains("Rule LFT: complete"));
}

#[test]
fn cli_runall_without_complete_rule_drops_the_previous_schedule() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("unstaffable.msrcp");
    fs::write(
        &path,
        "\\* Project Module *\\\n1 1 1 3\n5\n5\n1 0\n\\* Workforce Module *\\\n0\n\\* Skill Requirements Module *\\\n1\n",
    )
    .expect("write instance");
    let script = format!("load {}\nrun EFT\nrunall\nverify\nquit\n", path.display());
    run_cli(&script)
        .success()
        .stdout(str_contains("Rule EFT: INCOMPLETE"))
        .stdout(str_contains("No rule produced a complete schedule."))
        .stdout(str_contains("No schedule yet."));
}
