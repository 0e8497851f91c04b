use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn practica_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("practica"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run practica");
    assert!(
        output.status.success(),
        "practica failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout utf8")
}

#[test]
fn show_prints_default_template() {
    let home = TempDir::new().expect("home");
    practica_cmd(home.path())
        .args(["template", "show", "institution"])
        .assert()
        .success()
        .stdout(contains("(default)"))
        .stdout(contains("Subject: Asignación de estudiantes en práctica"))
        .stdout(contains("{{TABLA_ESTUDIANTES}}"));
}

#[test]
fn set_then_show_and_diff() {
    let home = TempDir::new().expect("home");
    let body = home.path().join("body.txt");
    fs::write(&body, "Hola [Nombre Estudiante]\r\n\r\nSaludos").expect("write body");

    practica_cmd(home.path())
        .args(["template", "set", "student", "--subject", "Tu práctica"])
        .arg("--body-file")
        .arg(&body)
        .assert()
        .success();

    practica_cmd(home.path())
        .args(["template", "show", "student"])
        .assert()
        .success()
        .stdout(contains("(customized)"))
        .stdout(contains("Subject: Tu práctica"));

    let diff = stdout_of(practica_cmd(home.path()).args(["template", "diff", "student"]));
    assert!(diff.contains("--- a/default/student"));
    assert!(diff.contains("+++ b/stored/student"));
    assert!(diff.lines().any(|l| l == "+Subject: Tu práctica"));
    assert!(diff.lines().any(|l| l == "+Hola [Nombre Estudiante]"));
}

#[test]
fn set_without_fields_fails() {
    let home = TempDir::new().expect("home");
    practica_cmd(home.path())
        .args(["template", "set", "student"])
        .assert()
        .failure()
        .stderr(contains("nothing to set"));
}

#[test]
fn reset_restores_default() {
    let home = TempDir::new().expect("home");
    practica_cmd(home.path())
        .args(["template", "set", "institution", "--subject", "Otro"])
        .assert()
        .success();
    practica_cmd(home.path())
        .args(["template", "reset", "institution"])
        .assert()
        .success();

    practica_cmd(home.path())
        .args(["template", "diff", "institution"])
        .assert()
        .success()
        .stdout(contains("No differences"));
}

#[test]
fn placeholders_lists_catalog() {
    let home = TempDir::new().expect("home");
    practica_cmd(home.path())
        .args(["template", "placeholders", "institution"])
        .assert()
        .success()
        .stdout(contains("{{TABLA_ESTUDIANTES}}"))
        .stdout(contains("block"))
        .stdout(contains("[Nombre Institución]"));
}

#[test]
fn preview_renders_sample_table_unwrapped() {
    let home = TempDir::new().expect("home");
    let output = stdout_of(practica_cmd(home.path()).args([
        "template",
        "preview",
        "institution",
        "--json",
    ]));
    let json: serde_json::Value = serde_json::from_str(&output).expect("json");
    let html = json["html"].as_str().expect("html");

    assert!(html.contains("<table"));
    assert!(!html.contains("<p><table"));
    assert!(!html.contains("[Nombre"));
    assert!(!json["subject"].as_str().expect("subject").contains('['));
}

#[test]
fn render_with_students_and_text_values() {
    let home = TempDir::new().expect("home");
    let students = home.path().join("students.json");
    fs::write(
        &students,
        r#"[{"name":"Ana <b>Pérez</b>","rut":"19.456.789-0","career":"Enfermería"}]"#,
    )
    .expect("write students");

    practica_cmd(home.path())
        .args(["template", "render", "institution"])
        .arg("--students")
        .arg(&students)
        .args(["--text", "[Nombre Institución]=CESFAM Norte"])
        .assert()
        .success()
        .stdout(contains("Subject: Asignación de estudiantes en práctica - CESFAM Norte"))
        .stdout(contains("Ana &lt;b&gt;Pérez&lt;"))
        .stdout(contains("<p><table").not());
}

#[test]
fn render_with_html_fragment_file() {
    let home = TempDir::new().expect("home");
    let fragment = home.path().join("table.html");
    fs::write(&fragment, "<table><tr><td>x</td></tr></table>\n").expect("write fragment");

    practica_cmd(home.path())
        .args(["template", "render", "institution"])
        .arg("--html")
        .arg(format!("{{{{TABLA_ESTUDIANTES}}}}={}", fragment.display()))
        .assert()
        .success()
        .stdout(contains("\n<table><tr><td>x</td></tr></table>\n"));
}

#[test]
fn malformed_key_value_is_rejected() {
    let home = TempDir::new().expect("home");
    practica_cmd(home.path())
        .args(["template", "render", "student", "--text", "no-equals-sign"])
        .assert()
        .failure()
        .stderr(contains("expected KEY=VALUE"));
}

#[test]
fn user_fragment_override_is_used() {
    let home = TempDir::new().expect("home");
    let dir = home.path().join(".practica").join("templates");
    fs::create_dir_all(&dir).expect("create templates dir");
    fs::write(
        dir.join("students_table.html.tera"),
        "<ul>{% for s in students %}<li>{{ s.name }}</li>{% endfor %}</ul>",
    )
    .expect("write override");

    practica_cmd(home.path())
        .args(["template", "preview", "institution"])
        .assert()
        .success()
        .stdout(contains("<ul><li>Ana Pérez Soto</li>"));
}

#[test]
fn corrupt_store_file_blocks_template_load_with_hint() {
    let home = TempDir::new().expect("home");
    let root = home.path().join(".practica");
    fs::create_dir_all(&root).expect("create root");
    fs::write(root.join("store.json"), "{ not json").expect("write store");

    practica_cmd(home.path())
        .args(["template", "show", "student"])
        .assert()
        .failure()
        .stderr(contains("fix or remove"));
}

#[test]
fn render_logs_placeholder_counts_at_debug() {
    let home = TempDir::new().expect("home");
    practica_cmd(home.path())
        .env("RUST_LOG", "debug")
        .args(["template", "render", "student", "--text", "[Nombre Estudiante]=Ana"])
        .assert()
        .success()
        .stderr(contains("rendering template"));
}
