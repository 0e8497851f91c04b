//! Domain types for the practicum coordination workflow.
//!
//! All types are serializable/deserializable via serde so they can travel
//! through the key-value store, `config.yaml`, and CLI JSON inputs.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One step of the three-step coordination workflow.
///
/// Variant order is workflow order; the derived `Ord` compares by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    StudentSelection = 0,
    InstitutionNotification = 1,
    StudentNotification = 2,
}

impl Stage {
    /// All stages in workflow order.
    pub fn all() -> &'static [Stage] {
        &[
            Stage::StudentSelection,
            Stage::InstitutionNotification,
            Stage::StudentNotification,
        ]
    }

    /// The first stage; also the fallback for absent or invalid progress.
    pub const fn initial() -> Stage {
        Stage::StudentSelection
    }

    pub const fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Stage> {
        match level {
            0 => Some(Stage::StudentSelection),
            1 => Some(Stage::InstitutionNotification),
            2 => Some(Stage::StudentNotification),
            _ => None,
        }
    }

    /// Parse a persisted progress value (`"0"`, `"1"`, `"2"`).
    ///
    /// Returns `None` for anything non-numeric or out of range.
    pub fn parse_persisted(raw: &str) -> Option<Stage> {
        raw.trim().parse::<u8>().ok().and_then(Stage::from_level)
    }

    /// The value written to the store for this stage.
    pub fn to_persisted(self) -> String {
        self.level().to_string()
    }

    pub fn next(self) -> Option<Stage> {
        Stage::from_level(self.level() + 1)
    }

    /// Stable kebab-case identifier, also accepted on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Stage::StudentSelection => "student-selection",
            Stage::InstitutionNotification => "institution-notification",
            Stage::StudentNotification => "student-notification",
        }
    }

    /// Parse either a level (`"1"`) or a slug (`"institution-notification"`).
    pub fn from_name(name: &str) -> Option<Stage> {
        let name = name.trim();
        Stage::parse_persisted(name).or_else(|| {
            Stage::all()
                .iter()
                .copied()
                .find(|s| s.slug().eq_ignore_ascii_case(name))
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Which notification e-mail a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Sent to institutions with the list of assigned students.
    Institution,
    /// Sent to each student with their placement details.
    Student,
}

impl TemplateKind {
    pub fn all() -> &'static [TemplateKind] {
        &[TemplateKind::Institution, TemplateKind::Student]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Institution => "institution",
            TemplateKind::Student => "student",
        }
    }

    /// Store key holding the subject line.
    pub fn subject_key(self) -> String {
        format!("template.{}.subject", self.as_str())
    }

    /// Store key holding the plain-text body.
    pub fn body_key(self) -> String {
        format!("template.{}.body", self.as_str())
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authored e-mail template: subject line plus plain-text body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// One selected student, as listed in the institution notification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRow {
    pub name: String,
    /// National identifier (RUT).
    pub rut: String,
    pub career: String,
    #[serde(default)]
    pub email: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_follows_levels() {
        assert!(Stage::StudentSelection < Stage::InstitutionNotification);
        assert!(Stage::InstitutionNotification < Stage::StudentNotification);
        for stage in Stage::all() {
            assert_eq!(Stage::from_level(stage.level()), Some(*stage));
        }
    }

    #[test]
    fn parse_persisted_rejects_garbage() {
        assert_eq!(Stage::parse_persisted("1"), Some(Stage::InstitutionNotification));
        assert_eq!(Stage::parse_persisted(" 2\n"), Some(Stage::StudentNotification));
        assert_eq!(Stage::parse_persisted("banana"), None);
        assert_eq!(Stage::parse_persisted("99"), None);
        assert_eq!(Stage::parse_persisted("-1"), None);
        assert_eq!(Stage::parse_persisted(""), None);
    }

    #[test]
    fn from_name_accepts_level_or_slug() {
        assert_eq!(Stage::from_name("0"), Some(Stage::StudentSelection));
        assert_eq!(
            Stage::from_name("Student-Notification"),
            Some(Stage::StudentNotification)
        );
        assert_eq!(Stage::from_name("nope"), None);
    }

    #[test]
    fn next_stops_at_last_stage() {
        assert_eq!(Stage::StudentSelection.next(), Some(Stage::InstitutionNotification));
        assert_eq!(Stage::StudentNotification.next(), None);
    }

    #[test]
    fn template_keys_are_per_kind() {
        assert_eq!(TemplateKind::Institution.subject_key(), "template.institution.subject");
        assert_eq!(TemplateKind::Student.body_key(), "template.student.body");
    }

    #[test]
    fn student_row_email_defaults_when_missing() {
        let row: StudentRow =
            serde_json::from_str(r#"{"name":"Ana","rut":"1-9","career":"Nursing"}"#)
                .expect("deserialize");
        assert!(row.email.is_empty());
    }
}
