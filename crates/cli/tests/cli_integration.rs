use std::process::Command;

fn repeat() -> Command {
    Command::new(env!("CARGO_BIN_EXE_repeat"))
}

#[test]
fn help_works() {
    let out = repeat()
        .arg("--help")
        .output()
        .expect("failed to run repeat --help");
    assert!(
        out.status.success(),
        "repeat --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Print a message several times")
            && stdout.contains("--count")
            && stdout.contains("<MESSAGE>"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn help_wins_over_invalid_argv() {
    let out = repeat()
        .args(["--no-such-flag", "--help"])
        .output()
        .expect("failed to run repeat");
    assert!(
        out.status.success(),
        "expected exit 0 when --help is present:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--count"), "unexpected output:\n{stdout}");
}

#[test]
fn prints_message_count_times() {
    let out = repeat()
        .args(["--count", "3", "hi"])
        .output()
        .expect("failed to run repeat");
    assert!(
        out.status.success(),
        "repeat failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(
        stdout.lines().filter(|line| *line == "hi").count(),
        3,
        "unexpected output:\n{stdout}"
    );
}

#[test]
fn upper_switch_applies() {
    let out = repeat()
        .args(["-u", "--count", "1", "hi"])
        .output()
        .expect("failed to run repeat");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("HI"), "unexpected output:\n{stdout}");
}

#[test]
fn rejects_non_numeric_count() {
    let out = repeat()
        .args(["--count", "lots", "hi"])
        .output()
        .expect("failed to run repeat");
    assert_eq!(
        out.status.code(),
        Some(1),
        "expected exit 1 for a conversion failure"
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("invalid value 'lots'") && stderr.contains("Usage"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn missing_required_inputs_fail() {
    let out = repeat().arg("hi").output().expect("failed to run repeat");
    assert_eq!(
        out.status.code(),
        Some(1),
        "expected exit 1 when --count is missing"
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("required"), "unexpected stderr:\n{stderr}");

    let out = repeat().output().expect("failed to run repeat");
    assert_eq!(out.status.code(), Some(1), "expected exit 1 for empty argv");
}

#[test]
fn unknown_flag_fails() {
    let out = repeat()
        .args(["--count", "1", "--shout", "hi"])
        .output()
        .expect("failed to run repeat");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--shout"), "unexpected stderr:\n{stderr}");
}
