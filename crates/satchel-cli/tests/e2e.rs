//! End-to-end tests for the satchel CLI.
//!
//! Tests invoke the `satchel` binary as a subprocess against a temporary
//! vault directory.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn satchel_in(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_satchel"));
    cmd.current_dir(dir);
    cmd
}

fn write_settings(dir: &Path, json: &str) {
    fs::create_dir_all(dir.join(".satchel")).unwrap();
    fs::write(dir.join(".satchel/settings.json"), json).unwrap();
}

/// Assets next to the note, one folder per note, filenames carrying the
/// note stem.
const NEXT_TO_NOTE: &str = r#"{
  "attach_path": {
    "attachment_root": "./assets",
    "save_mode": "next-to-note",
    "attachment_path": "${notepath}/${notename}",
    "attach_format": "${notename}_${date}"
  },
  "date_format": "%Y%m%d"
}"#;

fn run(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn e2e_resolve_prints_the_attachment_folder() {
    let dir = TempDir::new().unwrap();
    write_settings(dir.path(), NEXT_TO_NOTE);
    fs::create_dir_all(dir.path().join("Notes")).unwrap();
    fs::write(dir.path().join("Notes/Intro.md"), "# Intro\n").unwrap();

    let stdout = run(satchel_in(dir.path()).args(["resolve", "Notes/Intro.md"]));
    assert!(
        stdout.contains("attachment folder: Notes/assets/Notes/Intro"),
        "unexpected output: {stdout}"
    );
    assert!(stdout.contains("attachment name:   Intro_"));
}

#[test]
fn e2e_rename_propagates_to_attachment_folder_and_files() {
    let dir = TempDir::new().unwrap();
    write_settings(dir.path(), NEXT_TO_NOTE);
    fs::create_dir_all(dir.path().join("Notes/assets/Notes/Intro")).unwrap();
    fs::write(dir.path().join("Notes/Intro.md"), "# Intro\n").unwrap();
    fs::write(
        dir.path().join("Notes/assets/Notes/Intro/Intro_20260807.png"),
        b"img",
    )
    .unwrap();

    let stdout = run(satchel_in(dir.path()).args(["rename", "Notes/Intro.md", "Notes/Overview.md"]));
    assert!(stdout.contains("moved attachment folder"), "{stdout}");

    assert!(dir.path().join("Notes/Overview.md").exists());
    assert!(dir
        .path()
        .join("Notes/assets/Notes/Overview/Overview_20260807.png")
        .exists());
    assert!(!dir.path().join("Notes/assets/Notes/Intro").exists());
}

#[test]
fn e2e_rename_reports_conflict_when_destination_exists() {
    let dir = TempDir::new().unwrap();
    write_settings(dir.path(), NEXT_TO_NOTE);
    fs::create_dir_all(dir.path().join("Notes/assets/Notes/Intro")).unwrap();
    fs::create_dir_all(dir.path().join("Notes/assets/Notes/Overview")).unwrap();
    fs::write(dir.path().join("Notes/Intro.md"), "# Intro\n").unwrap();
    fs::write(dir.path().join("Notes/assets/Notes/Intro/Intro_1.png"), b"x").unwrap();

    let stdout = run(satchel_in(dir.path()).args(["rename", "Notes/Intro.md", "Notes/Overview.md"]));
    assert!(stdout.contains("conflict"), "{stdout}");
    // folder left unmoved
    assert!(dir.path().join("Notes/assets/Notes/Intro/Intro_1.png").exists());
}

#[test]
fn e2e_intake_moves_the_file_and_updates_the_link() {
    let dir = TempDir::new().unwrap();
    write_settings(dir.path(), NEXT_TO_NOTE);
    fs::create_dir_all(dir.path().join("Notes")).unwrap();
    fs::write(
        dir.path().join("Notes/Intro.md"),
        "# Intro\n![[shot.png]]\n",
    )
    .unwrap();
    fs::write(dir.path().join("shot.png"), b"img").unwrap();

    let stdout = run(satchel_in(dir.path()).args(["intake", "shot.png", "--note", "Notes/Intro.md"]));
    assert!(stdout.contains("moved shot.png to Notes/assets/Notes/Intro/Intro_"), "{stdout}");
    assert!(stdout.contains("updated 1 link"), "{stdout}");

    assert!(!dir.path().join("shot.png").exists());
    let note = fs::read_to_string(dir.path().join("Notes/Intro.md")).unwrap();
    assert!(note.contains("![[Notes/assets/Notes/Intro/Intro_"), "{note}");
    assert!(!note.contains("![[shot.png]]"));
}

#[test]
fn e2e_intake_skips_non_images_by_default() {
    let dir = TempDir::new().unwrap();
    write_settings(dir.path(), NEXT_TO_NOTE);
    fs::create_dir_all(dir.path().join("Notes")).unwrap();
    fs::write(dir.path().join("Notes/Intro.md"), "# Intro\n").unwrap();
    fs::write(dir.path().join("report.pdf"), b"pdf").unwrap();

    let stdout = run(satchel_in(dir.path()).args(["intake", "report.pdf", "--note", "Notes/Intro.md"]));
    assert!(stdout.contains("skipped"), "{stdout}");
    assert!(dir.path().join("report.pdf").exists());
}

#[test]
fn e2e_override_set_and_reset_roundtrip() {
    let dir = TempDir::new().unwrap();
    write_settings(dir.path(), NEXT_TO_NOTE);
    fs::create_dir_all(dir.path().join("Notes")).unwrap();
    fs::write(dir.path().join("Notes/Intro.md"), "# Intro\n").unwrap();

    run(satchel_in(dir.path()).args([
        "override",
        "set",
        "Notes/Intro.md",
        "--root",
        "special",
        "--save-mode",
        "fixed-folder",
        "--path-template",
        "${notename}",
    ]));

    let config = run(satchel_in(dir.path()).arg("config"));
    let parsed: serde_json::Value = serde_json::from_str(&config).unwrap();
    let entry = &parsed["override_path"]["Notes/Intro.md"];
    assert_eq!(entry["attachment_root"], "special");
    assert_eq!(entry["scope"], "FILE");

    let resolve = run(satchel_in(dir.path()).args(["resolve", "Notes/Intro.md"]));
    assert!(resolve.contains("attachment folder: special/Intro"), "{resolve}");
    assert!(resolve.contains("per-path override active"));

    let stdout = run(satchel_in(dir.path()).args(["override", "reset", "Notes/Intro.md"]));
    assert!(stdout.contains("reset attachment setting"), "{stdout}");

    let config = run(satchel_in(dir.path()).arg("config"));
    let parsed: serde_json::Value = serde_json::from_str(&config).unwrap();
    assert!(parsed["override_path"]
        .as_object()
        .unwrap()
        .is_empty());
}

#[test]
fn e2e_folder_override_applies_to_contained_notes() {
    let dir = TempDir::new().unwrap();
    write_settings(dir.path(), NEXT_TO_NOTE);
    fs::create_dir_all(dir.path().join("Projects")).unwrap();
    fs::write(dir.path().join("Projects/Alpha.md"), "# Alpha\n").unwrap();

    run(satchel_in(dir.path()).args([
        "override",
        "set",
        "Projects",
        "--root",
        "Projects/media",
        "--save-mode",
        "fixed-folder",
        "--path-template",
        "${notename}",
    ]));

    let resolve = run(satchel_in(dir.path()).args(["resolve", "Projects/Alpha.md"]));
    assert!(
        resolve.contains("attachment folder: Projects/media/Alpha"),
        "{resolve}"
    );
}

#[test]
fn e2e_excluded_path_resolves_as_excluded() {
    let dir = TempDir::new().unwrap();
    write_settings(
        dir.path(),
        r#"{ "excluded_paths": "Daily", "exclude_subpaths": true }"#,
    );

    let stdout = run(satchel_in(dir.path()).args(["resolve", "Daily/2026-08-07.md"]));
    assert!(stdout.contains("excluded"), "{stdout}");
}
