//! `config.yaml` settings and the stage → path route table.
//!
//! Missing file → defaults. Missing fields fall back to their defaults, so a
//! config that only overrides one route is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths;
use crate::types::Stage;

pub const DEFAULT_STUDENT_SELECTION_PATH: &str = "/coordinacion/seleccion-estudiantes";
pub const DEFAULT_INSTITUTION_NOTIFICATION_PATH: &str = "/coordinacion/notificar-instituciones";
pub const DEFAULT_STUDENT_NOTIFICATION_PATH: &str = "/coordinacion/notificar-estudiantes";

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

/// Navigation path for each [`Stage`]. Must stay a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RouteTable {
    pub student_selection: String,
    pub institution_notification: String,
    pub student_notification: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            student_selection: DEFAULT_STUDENT_SELECTION_PATH.to_string(),
            institution_notification: DEFAULT_INSTITUTION_NOTIFICATION_PATH.to_string(),
            student_notification: DEFAULT_STUDENT_NOTIFICATION_PATH.to_string(),
        }
    }
}

impl RouteTable {
    pub fn path(&self, stage: Stage) -> &str {
        match stage {
            Stage::StudentSelection => &self.student_selection,
            Stage::InstitutionNotification => &self.institution_notification,
            Stage::StudentNotification => &self.student_notification,
        }
    }

    /// Stage whose path prefixes `location`, if any.
    ///
    /// A path matches when `location` equals it or continues with `/`, `?`
    /// or `#`; `/a/b` matches `/a/b/step` but not `/a/bc`.
    pub fn stage_for(&self, location: &str) -> Option<Stage> {
        Stage::all()
            .iter()
            .copied()
            .find(|stage| path_matches(self.path(*stage), location))
    }

    /// Every path is absolute, distinct, and not a segment prefix of another.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for stage in Stage::all() {
            let path = self.path(*stage);
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidRoutes(format!(
                    "path for {stage} must start with '/', got '{path}'"
                )));
            }
        }
        for a in Stage::all() {
            for b in Stage::all() {
                if a == b {
                    continue;
                }
                let (pa, pb) = (self.path(*a), self.path(*b));
                if path_matches(pa, pb) {
                    return Err(ConfigError::InvalidRoutes(format!(
                        "path for {b} ('{pb}') overlaps path for {a} ('{pa}')"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn path_matches(path: &str, location: &str) -> bool {
    match location.strip_prefix(path) {
        Some(rest) => {
            rest.is_empty()
                || path.ends_with('/')
                || rest.starts_with(['/', '?', '#'])
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub routes: RouteTable,
}

/// Load `<home>/.practica/config.yaml`, validating the route table.
pub fn load_at(home: &Path) -> Result<Settings, ConfigError> {
    let path = paths::config_path(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;
    let settings: Settings = if contents.trim().is_empty() {
        Settings::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?
    };
    settings.routes.validate()?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    load_at(&home)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_routes_are_valid() {
        RouteTable::default().validate().expect("defaults validate");
    }

    #[test]
    fn stage_for_matches_exact_and_nested_paths() {
        let routes = RouteTable::default();
        assert_eq!(
            routes.stage_for("/coordinacion/notificar-instituciones"),
            Some(Stage::InstitutionNotification)
        );
        assert_eq!(
            routes.stage_for("/coordinacion/notificar-estudiantes/preview?x=1"),
            Some(Stage::StudentNotification)
        );
        assert_eq!(routes.stage_for("/coordinacion/seleccion-estudiantesX"), None);
        assert_eq!(routes.stage_for("/estudiantes"), None);
    }

    #[test]
    fn overlapping_routes_are_rejected() {
        let routes = RouteTable {
            student_selection: "/flow".into(),
            institution_notification: "/flow/institutions".into(),
            ..RouteTable::default()
        };
        let err = routes.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoutes(_)), "got: {err}");
    }

    #[test]
    fn duplicate_routes_are_rejected() {
        let routes = RouteTable {
            student_notification: DEFAULT_STUDENT_SELECTION_PATH.into(),
            ..RouteTable::default()
        };
        assert!(routes.validate().is_err());
    }

    #[test]
    fn relative_route_is_rejected() {
        let routes = RouteTable {
            student_selection: "select".into(),
            ..RouteTable::default()
        };
        let err = routes.validate().unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let settings: Settings =
            serde_yaml::from_str("routes:\n  student-notification: /notify/students\n")
                .expect("parse");
        assert_eq!(settings.routes.student_notification, "/notify/students");
        assert_eq!(settings.routes.student_selection, DEFAULT_STUDENT_SELECTION_PATH);
    }
}
