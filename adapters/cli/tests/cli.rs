use std::{
    fs,
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
};

const FOCUS: &str = r#"
defender = { x = 5000, y = 2000 }

[[data_points]]
id = 0
x = 5000
y = 8500

[[enemies]]
id = 1
x = 5000
y = 4500
life = 20
"#;

const COLLECTED: &str = r#"
defender = { x = 8000, y = 4000 }

[[data_points]]
id = 0
x = 5000
y = 5000

[[enemies]]
id = 1
x = 5000
y = 4500
life = 100
"#;

fn accountant(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_accountant"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to launch accountant binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to feed stdin");
    child.wait_with_output().expect("accountant did not finish")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is utf8")
}

fn path(path: &Path) -> &str {
    path.to_str().expect("temporary paths are utf8")
}

#[test]
fn bot_answers_every_turn_with_one_line() {
    let turns = "1000 1000\n1\n0 15000 8000\n2\n0 3000 3000 10\n1 9000 8000 10\n\
                 1000 1000\n1\n0 15000 8000\n1\n1 9500 8000 10\n\
                 1000 1000\n1\n0 15000 8000\n0\n";

    let output = accountant(&["bot", "--policy", "nearest-shot"], turns);

    assert!(output.status.success(), "bot failed: {output:?}");
    assert_eq!(stdout(&output), "SHOOT 0\nSHOOT 1\nMOVE 1000 1000\n");
}

#[test]
fn bot_rejects_malformed_turns() {
    let output = accountant(&["bot", "--policy", "nearest-shot"], "1000\n");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("defender position"), "stderr: {stderr}");
}

#[test]
fn play_prints_match_report() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let scenario = dir.path().join("focus.toml");
    fs::write(&scenario, FOCUS).expect("write scenario");

    let output = accountant(&["play", path(&scenario), "--policy", "nearest-shot"], "");

    assert!(output.status.success(), "play failed: {output:?}");
    assert_eq!(
        stdout(&output),
        "focus score=143 turns=3 bonus=33 shots=3 defender_killed=false\n"
    );
}

#[test]
fn configuration_file_selects_policy() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let scenario = dir.path().join("focus.toml");
    let config = dir.path().join("planner.toml");
    fs::write(&scenario, FOCUS).expect("write scenario");
    fs::write(&config, "policy = \"nearest-shot\"\n").expect("write config");

    let output = accountant(&["--config", path(&config), "play", path(&scenario)], "");

    assert!(output.status.success(), "play failed: {output:?}");
    assert!(stdout(&output).starts_with("focus score=143 "));
}

#[test]
fn compare_summarises_both_policies() {
    let dir = tempfile::tempdir().expect("temporary directory");
    fs::write(dir.path().join("collected.toml"), COLLECTED).expect("write scenario");
    fs::write(dir.path().join("focus.toml"), FOCUS).expect("write scenario");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("write notes");

    let output = accountant(
        &[
            "compare",
            path(dir.path()),
            "--baseline",
            "nearest-shot",
            "--candidate",
            "nearest-shot",
        ],
        "",
    );

    assert!(output.status.success(), "compare failed: {output:?}");
    assert_eq!(
        stdout(&output),
        "Sum (nearest-shot -> nearest-shot): 143 -> 143\n\
         Bonus: 33 -> 33 (23.08% -> 23.08%)\n\
         Positive bonus: 50.00% -> 50.00%\n"
    );
}

#[test]
fn unknown_policy_is_reported() {
    let output = accountant(&["bot", "--policy", "greedy"], "");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown policy"), "stderr: {stderr}");
}
