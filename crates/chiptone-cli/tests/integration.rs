//! Integration tests for chiptone-cli.
//!
//! Exercise the binary without audio hardware: help output, the `parse`
//! command, config loading, and argument validation.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

/// Helper to get the path to the `chiptone` binary built by cargo.
fn chiptone_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_chiptone"));
    cmd.env("RUST_LOG", "off");
    cmd
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

#[test]
fn cli_help_lists_subcommands() {
    let output = chiptone_bin()
        .arg("--help")
        .output()
        .expect("failed to run chiptone --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["tone", "notes", "parse", "devices"] {
        assert!(stdout.contains(cmd), "help should mention '{cmd}'");
    }
}

// ---------------------------------------------------------------------------
// chiptone parse
// ---------------------------------------------------------------------------

#[test]
fn cli_parse_prints_frequencies() {
    let output = chiptone_bin()
        .args(["parse", "^^^A 2C# -"])
        .output()
        .expect("failed to run chiptone parse");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("440"), "got:\n{stdout}");
    assert!(stdout.contains("2C#3"), "got:\n{stdout}");
    assert!(stdout.contains("3 tokens, 4 units"), "got:\n{stdout}");
}

#[test]
fn cli_parse_reports_skipped_characters() {
    let output = chiptone_bin()
        .args(["parse", "C x D"])
        .output()
        .expect("failed to run chiptone parse");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 tokens"), "got:\n{stdout}");
    assert!(
        stdout.contains("skipped unknown character 'x' at 2"),
        "got:\n{stdout}"
    );
}

#[test]
fn cli_parse_base_octave_flag() {
    let output = chiptone_bin()
        .args(["parse", "--base-octave", "3", "A"])
        .output()
        .expect("failed to run chiptone parse");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("440"), "got:\n{stdout}");
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn cli_config_sets_base_octave() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "base_octave = 3\n").unwrap();

    let output = chiptone_bin()
        .arg("--config")
        .arg(&path)
        .args(["parse", "A"])
        .output()
        .expect("failed to run chiptone parse");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("440"), "got:\n{stdout}");
}

#[test]
fn cli_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "sample_rate = 0\n").unwrap();

    let output = chiptone_bin()
        .arg("--config")
        .arg(&path)
        .args(["parse", "A"])
        .output()
        .expect("failed to run chiptone parse");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sample_rate"), "got:\n{stderr}");
}

// ---------------------------------------------------------------------------
// Argument validation
// ---------------------------------------------------------------------------

#[test]
fn cli_tone_rejects_out_of_range_arguments() {
    for args in [
        vec!["tone", "--hz", "440", "--volume", "11"],
        vec!["tone", "--hz", "440", "--voice", "5"],
        vec!["tone", "--hz", "440", "--effect", "wobble"],
        vec!["tone", "--hz", "440", "--level", "16001"],
    ] {
        let output = chiptone_bin().args(&args).output().unwrap();
        assert!(!output.status.success(), "{args:?} should fail");
    }
}

#[test]
fn cli_notes_rejects_short_increment() {
    let output = chiptone_bin()
        .args(["notes", "--increment", "50", "CDE"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_voice_must_be_below_voice_count() {
    for args in [
        vec!["tone", "--hz", "440", "--voice", "7"],
        vec!["notes", "--voice", "5", "CDE"],
        vec!["notes", "--volume", "11", "CDE"],
    ] {
        let output = chiptone_bin().args(&args).output().unwrap();
        assert!(!output.status.success(), "{args:?} should fail");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("not in"), "{args:?}: {stderr}");
    }
}
