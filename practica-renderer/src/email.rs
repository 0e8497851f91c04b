//! Built-in templates, composition of a finished e-mail, and previews.

use serde::Serialize;

use practica_core::types::{EmailTemplate, TemplateKind};

use crate::catalog::{self, PlaceholderKind};
use crate::engine::{self, Placeholders};
use crate::error::RenderError;
use crate::fragments::{sample_students, FragmentEngine};

const INSTITUTION_SUBJECT: &str =
    "Asignación de estudiantes en práctica - [Nombre Institución]";
const STUDENT_SUBJECT: &str = "Asignación de práctica - [Nombre Institución]";

/// The template used when nothing has been stored for `kind`.
pub fn default_template(kind: TemplateKind) -> EmailTemplate {
    let (subject, body) = match kind {
        TemplateKind::Institution => (
            INSTITUTION_SUBJECT,
            include_str!("templates/institution_body.txt"),
        ),
        TemplateKind::Student => (STUDENT_SUBJECT, include_str!("templates/student_body.txt")),
    };
    EmailTemplate {
        subject: subject.to_string(),
        body: body.trim_end().replace("\r\n", "\n"),
    }
}

/// A template after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Render `template` into a ready-to-send e-mail.
///
/// The body goes through [`engine::render`]. The subject only receives text
/// substitution; block placeholders in a subject are left as typed.
pub fn compose(
    template: &EmailTemplate,
    html_placeholders: &Placeholders,
    text_placeholders: &Placeholders,
) -> RenderedEmail {
    RenderedEmail {
        subject: engine::substitute_text(template.subject.clone(), text_placeholders),
        html: engine::render(&template.body, html_placeholders, text_placeholders),
    }
}

/// Render `template` with the catalog's example values for `kind`.
pub fn preview(
    kind: TemplateKind,
    template: &EmailTemplate,
    fragments: &FragmentEngine,
) -> Result<RenderedEmail, RenderError> {
    let mut html = Placeholders::new();
    let mut text = Placeholders::new();
    for spec in catalog::catalog(kind) {
        match spec.kind {
            PlaceholderKind::Text => {
                text.insert(spec.key, spec.example);
            }
            PlaceholderKind::Block => {
                html.insert(spec.key, sample_block(spec.key, fragments)?);
            }
        }
    }
    Ok(compose(template, &html, &text))
}

fn sample_block(key: &str, fragments: &FragmentEngine) -> Result<String, RenderError> {
    match key {
        catalog::STUDENTS_TABLE => fragments.students_table(&sample_students()),
        other => Ok(format!("<div>{other}</div>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_only_use_catalog_placeholders() {
        for kind in TemplateKind::all() {
            let template = default_template(*kind);
            let rendered = preview(*kind, &template, &FragmentEngine::new(None).unwrap())
                .expect("preview");
            assert!(!rendered.html.contains('['), "unresolved token in {kind}: {}", rendered.html);
            assert!(!rendered.subject.contains('['), "unresolved token in {kind} subject");
            assert!(!rendered.html.contains("{{"), "unresolved block in {kind}");
        }
    }

    #[test]
    fn institution_preview_table_is_not_wrapped() {
        let template = default_template(TemplateKind::Institution);
        let rendered = preview(
            TemplateKind::Institution,
            &template,
            &FragmentEngine::new(None).unwrap(),
        )
        .unwrap();
        assert!(rendered.html.contains("\n<table"));
        assert!(!rendered.html.contains("<p><table"));
        assert!(rendered.html.contains("Ana Pérez Soto"));
    }

    #[test]
    fn subject_gets_text_substitution_only() {
        let template = EmailTemplate {
            subject: "Hola [NAME] {{T}}".into(),
            body: "x".into(),
        };
        let email = compose(
            &template,
            &Placeholders::new().with("{{T}}", "<table></table>"),
            &Placeholders::new().with("[NAME]", "Ana"),
        );
        assert_eq!(email.subject, "Hola Ana {{T}}");
        assert_eq!(email.html, "<p>x</p>");
    }

    #[test]
    fn default_bodies_have_no_trailing_newline() {
        for kind in TemplateKind::all() {
            assert!(!default_template(*kind).body.ends_with('\n'));
        }
    }
}
