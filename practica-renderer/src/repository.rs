//! Template persistence on top of a [`KeyValueStore`].
//!
//! Each kind uses two keys (`template.<kind>.subject`, `template.<kind>.body`).
//! A missing key falls back to the built-in default for that field only, so
//! an author who edited just the subject still gets the default body.

use practica_core::store::KeyValueStore;
use practica_core::types::{EmailTemplate, TemplateKind};

use crate::email::default_template;
use crate::error::RenderError;

/// Loads and saves e-mail templates.
pub struct TemplateRepository<S> {
    store: S,
}

impl<S: KeyValueStore> TemplateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self, kind: TemplateKind) -> Result<EmailTemplate, RenderError> {
        let defaults = default_template(kind);
        Ok(EmailTemplate {
            subject: self
                .store
                .get(&kind.subject_key())?
                .unwrap_or(defaults.subject),
            body: self.store.get(&kind.body_key())?.unwrap_or(defaults.body),
        })
    }

    pub fn save(&self, kind: TemplateKind, template: &EmailTemplate) -> Result<(), RenderError> {
        self.store.set(&kind.subject_key(), &template.subject)?;
        self.store.set(&kind.body_key(), &template.body)?;
        tracing::info!(template = %kind, "template saved");
        Ok(())
    }

    /// Overwrite the stored template with the built-in default.
    pub fn reset(&self, kind: TemplateKind) -> Result<EmailTemplate, RenderError> {
        let defaults = default_template(kind);
        self.save(kind, &defaults)?;
        Ok(defaults)
    }

    /// Whether the effective template differs from the built-in default.
    pub fn is_customized(&self, kind: TemplateKind) -> Result<bool, RenderError> {
        Ok(self.load(kind)? != default_template(kind))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practica_core::MemoryStore;

    #[test]
    fn load_falls_back_to_defaults() {
        let repo = TemplateRepository::new(MemoryStore::new());
        let template = repo.load(TemplateKind::Student).unwrap();
        assert_eq!(template, default_template(TemplateKind::Student));
        assert!(!repo.is_customized(TemplateKind::Student).unwrap());
    }

    #[test]
    fn save_then_load_roundtrip_uses_two_keys() {
        let repo = TemplateRepository::new(MemoryStore::new());
        let custom = EmailTemplate {
            subject: "Hola".into(),
            body: "Cuerpo".into(),
        };
        repo.save(TemplateKind::Institution, &custom).unwrap();
        assert_eq!(repo.load(TemplateKind::Institution).unwrap(), custom);

        let entries = repo.store().snapshot();
        assert_eq!(entries.get("template.institution.subject").map(String::as_str), Some("Hola"));
        assert_eq!(entries.get("template.institution.body").map(String::as_str), Some("Cuerpo"));
        // other kind untouched
        assert!(!entries.contains_key("template.student.body"));
    }

    #[test]
    fn fields_fall_back_independently() {
        let store = MemoryStore::with_entries([("template.student.subject", "Solo asunto")]);
        let repo = TemplateRepository::new(store);
        let template = repo.load(TemplateKind::Student).unwrap();
        assert_eq!(template.subject, "Solo asunto");
        assert_eq!(template.body, default_template(TemplateKind::Student).body);
        assert!(repo.is_customized(TemplateKind::Student).unwrap());
    }

    #[test]
    fn reset_restores_defaults() {
        let repo = TemplateRepository::new(MemoryStore::new());
        repo.save(
            TemplateKind::Student,
            &EmailTemplate {
                subject: "x".into(),
                body: "y".into(),
            },
        )
        .unwrap();
        let restored = repo.reset(TemplateKind::Student).unwrap();
        assert_eq!(restored, default_template(TemplateKind::Student));
        assert_eq!(repo.load(TemplateKind::Student).unwrap(), restored);
    }
}
