//! Tera-built HTML fragments for block placeholders.
//!
//! Fragment templates are embedded at compile time. A user template
//! directory (`<home>/.practica/templates/`) may override any of them with a
//! file of the same name plus a `.tera` suffix, e.g.
//! `students_table.html.tera`.
//!
//! Template names end in `.html`, so Tera autoescapes every interpolated
//! value: student data can never inject markup into the e-mail.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Tera;

use practica_core::types::StudentRow;

use crate::error::RenderError;

pub const STUDENTS_TABLE_TEMPLATE: &str = "students_table.html";

const TPLS: &[(&str, &str)] = &[(
    STUDENTS_TABLE_TEMPLATE,
    include_str!("templates/students_table.html.tera"),
)];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

/// `Students_Table.html.tera` → `students_table.html`
fn normalize_template_name(path: &Path) -> String {
    let name = path.to_string_lossy().replace('\\', "/").to_lowercase();
    match name.strip_suffix(".tera") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut templates = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!(template = %name, path = %path.display(), "user fragment template override");
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert((*name).to_string(), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// FragmentEngine
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StudentsTableCtx<'a> {
    students: &'a [StudentRow],
}

/// Renders the HTML fragments that block placeholders expand to.
pub struct FragmentEngine {
    tera: Tera,
}

impl FragmentEngine {
    /// Embedded templates plus any overrides in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(FragmentEngine {
            tera: build_tera(user_template_dir)?,
        })
    }

    /// `<table>` listing `rows`, for [`crate::catalog::STUDENTS_TABLE`].
    pub fn students_table(&self, rows: &[StudentRow]) -> Result<String, RenderError> {
        let ctx = tera::Context::from_serialize(StudentsTableCtx { students: rows })?;
        let html = self.tera.render(STUDENTS_TABLE_TEMPLATE, &ctx)?;
        Ok(html.trim_end().to_string())
    }
}

/// Rows used when previewing a template without real data.
pub fn sample_students() -> Vec<StudentRow> {
    vec![
        StudentRow {
            name: "Ana Pérez Soto".into(),
            rut: "19.456.789-0".into(),
            career: "Enfermería".into(),
            email: "ana.perez@alumnos.example.cl".into(),
        },
        StudentRow {
            name: "Diego Rojas Fuentes".into(),
            rut: "20.123.456-7".into(),
            career: "Enfermería".into(),
            email: "diego.rojas@alumnos.example.cl".into(),
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> StudentRow {
        StudentRow {
            name: name.into(),
            rut: "1-9".into(),
            career: "Kinesiología".into(),
            email: String::new(),
        }
    }

    #[test]
    fn engine_new_succeeds_with_embedded_templates() {
        FragmentEngine::new(None).expect("embedded fragment templates must parse");
    }

    #[test]
    fn table_has_one_row_per_student() {
        let engine = FragmentEngine::new(None).unwrap();
        let html = engine.students_table(&sample_students()).unwrap();
        assert!(html.starts_with("<table"));
        assert!(html.ends_with("</table>"));
        // header row + two students
        assert_eq!(html.matches("<tr>").count(), 3);
        assert!(html.contains("Diego Rojas Fuentes"));
    }

    #[test]
    fn empty_table_says_so() {
        let engine = FragmentEngine::new(None).unwrap();
        let html = engine.students_table(&[]).unwrap();
        assert!(html.contains("Sin estudiantes asignados"));
    }

    #[test]
    fn student_values_are_html_escaped() {
        let engine = FragmentEngine::new(None).unwrap();
        let html = engine.students_table(&[row("<b>Eve</b> & co")]).unwrap();
        assert!(html.contains("&lt;b&gt;Eve"), "got: {html}");
        assert!(html.contains("&amp; co"));
        assert!(!html.contains("<b>Eve"));
    }

    #[test]
    fn user_override_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("students_table.html.tera"),
            "<ul>{% for s in students %}<li>{{ s.name }}</li>{% endfor %}</ul>",
        )
        .unwrap();
        let engine = FragmentEngine::new(Some(dir.path())).unwrap();
        let html = engine.students_table(&[row("Ana")]).unwrap();
        assert_eq!(html, "<ul><li>Ana</li></ul>");
    }

    #[test]
    fn normalize_strips_tera_suffix() {
        assert_eq!(
            normalize_template_name(Path::new("Students_Table.html.tera")),
            "students_table.html"
        );
    }

    #[test]
    fn no_crlf_in_rendered_fragment() {
        let engine = FragmentEngine::new(None).unwrap();
        let html = engine.students_table(&sample_students()).unwrap();
        assert!(!html.contains('\r'));
    }
}
