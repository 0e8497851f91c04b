//! Placeholder catalog: the tokens a template author may use, per template.
//!
//! The catalog is display material for template editors (and the source of
//! preview values). [`crate::engine::render`] never consults it.

use serde::Serialize;

use practica_core::types::TemplateKind;

/// Block placeholder expanded to the selected-students table.
pub const STUDENTS_TABLE: &str = "{{TABLA_ESTUDIANTES}}";

pub const INSTITUTION_NAME: &str = "[Nombre Institución]";
pub const INSTITUTION_ADDRESS: &str = "[Dirección Institución]";
pub const COORDINATOR_NAME: &str = "[Nombre Coordinador]";
pub const STUDENT_NAME: &str = "[Nombre Estudiante]";
pub const CAREER_NAME: &str = "[Nombre Carrera]";
pub const TUTOR_NAME: &str = "[Nombre Tutor]";
pub const START_DATE: &str = "[Fecha Inicio]";
pub const END_DATE: &str = "[Fecha Término]";

/// How a placeholder is substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    /// Replaced by a plain string anywhere in the rendered HTML.
    Text,
    /// Replaced by an HTML fragment; never wrapped in `<p>` when it stands
    /// alone in a paragraph.
    Block,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaceholderSpec {
    pub key: &'static str,
    pub description: &'static str,
    pub kind: PlaceholderKind,
    /// Preview value for text placeholders; blocks are previewed with sample
    /// fragments instead.
    pub example: &'static str,
}

const fn text(
    key: &'static str,
    description: &'static str,
    example: &'static str,
) -> PlaceholderSpec {
    PlaceholderSpec {
        key,
        description,
        kind: PlaceholderKind::Text,
        example,
    }
}

const INSTITUTION: &[PlaceholderSpec] = &[
    text(INSTITUTION_NAME, "Nombre de la institución receptora", "Hospital Regional de Talca"),
    text(COORDINATOR_NAME, "Nombre del coordinador de práctica", "María González"),
    text(CAREER_NAME, "Carrera de los estudiantes asignados", "Enfermería"),
    text(START_DATE, "Fecha de inicio de la práctica", "03-03-2026"),
    text(END_DATE, "Fecha de término de la práctica", "27-06-2026"),
    PlaceholderSpec {
        key: STUDENTS_TABLE,
        description: "Tabla con los estudiantes asignados a la institución",
        kind: PlaceholderKind::Block,
        example: "",
    },
];

const STUDENT: &[PlaceholderSpec] = &[
    text(STUDENT_NAME, "Nombre completo del estudiante", "Ana Pérez Soto"),
    text(INSTITUTION_NAME, "Institución asignada", "Hospital Regional de Talca"),
    text(INSTITUTION_ADDRESS, "Dirección de la institución", "1 Norte 1990, Talca"),
    text(TUTOR_NAME, "Tutor clínico asignado", "Jorge Muñoz"),
    text(CAREER_NAME, "Carrera del estudiante", "Enfermería"),
    text(START_DATE, "Fecha de inicio de la práctica", "03-03-2026"),
    text(END_DATE, "Fecha de término de la práctica", "27-06-2026"),
];

/// Ordered placeholder catalog for `kind`.
pub fn catalog(kind: TemplateKind) -> &'static [PlaceholderSpec] {
    match kind {
        TemplateKind::Institution => INSTITUTION,
        TemplateKind::Student => STUDENT,
    }
}
