//! Stage progress gate.
//!
//! Decision precedence for [`StageGate::evaluate_and_redirect`]:
//! 1. `Loading` (not initialised yet, no navigation)
//! 2. `Ungated` (location outside the workflow routes)
//! 3. `Redirected` (location stage above the authoritative max level)
//! 4. `Allowed`
//!
//! The authoritative max level is `max(in-memory, persisted)`, re-read on
//! every evaluation so progress recorded through another gate sharing the
//! same store is honoured immediately.

use practica_core::config::RouteTable;
use practica_core::store::KeyValueStore;
use practica_core::types::Stage;

use crate::error::GateError;
use crate::navigation::{NavigationMode, Navigator};

/// Store key holding the highest stage reached, as `"0"`, `"1"` or `"2"`.
pub const PROGRESS_KEY: &str = "coordination.max_access_level";

/// Outcome of evaluating one location change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Loading,
    Ungated,
    Allowed { stage: Stage },
    Redirected { from: Stage, to: Stage },
}

/// Enforces that navigation never skips ahead of the highest stage reached.
pub struct StageGate<S> {
    store: S,
    routes: RouteTable,
    max_access_level: Option<Stage>,
}

impl<S: KeyValueStore> StageGate<S> {
    /// A gate in the loading state. Call [`StageGate::initialize`] before
    /// routing through it.
    pub fn new(store: S, routes: RouteTable) -> Self {
        Self {
            store,
            routes,
            max_access_level: None,
        }
    }

    pub fn with_default_routes(store: S) -> Self {
        Self::new(store, RouteTable::default())
    }

    /// Load progress from the store. Absent or invalid values yield the
    /// first stage.
    pub fn initialize(&mut self) -> Result<Stage, GateError> {
        let stage = self.read_persisted()?.unwrap_or(Stage::initial());
        self.max_access_level = Some(stage);
        tracing::debug!(max_access_level = %stage, "stage gate initialised");
        Ok(stage)
    }

    pub fn is_initialized(&self) -> bool {
        self.max_access_level.is_some()
    }

    /// `None` while loading.
    pub fn max_access_level(&self) -> Option<Stage> {
        self.max_access_level
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn path_for(&self, stage: Stage) -> &str {
        self.routes.path(stage)
    }

    /// Workflow stage for `location`, or `None` when it is not gated.
    pub fn current_location_stage(&self, location: &str) -> Option<Stage> {
        self.routes.stage_for(location)
    }

    /// Check a location change and redirect (replacing the history entry)
    /// when it reaches past the authoritative max level.
    pub fn evaluate_and_redirect<N>(
        &mut self,
        location: &str,
        navigator: &mut N,
    ) -> Result<GateDecision, GateError>
    where
        N: Navigator + ?Sized,
    {
        let Some(in_memory) = self.max_access_level else {
            return Ok(GateDecision::Loading);
        };
        let Some(requested) = self.current_location_stage(location) else {
            return Ok(GateDecision::Ungated);
        };

        let authoritative = self.authoritative_level(in_memory)?;
        if requested > authoritative {
            let target = self.routes.path(authoritative);
            tracing::info!(
                location,
                requested = %requested,
                redirect_to = target,
                "stage not yet reached, redirecting"
            );
            navigator.navigate(target, NavigationMode::Replace);
            return Ok(GateDecision::Redirected {
                from: requested,
                to: authoritative,
            });
        }

        tracing::debug!(location, stage = %requested, "stage access allowed");
        Ok(GateDecision::Allowed { stage: requested })
    }

    /// Record forward progress. Lower or equal levels are a no-op.
    ///
    /// Returns `true` when progress changed.
    pub fn advance_stage(&mut self, level: Stage) -> Result<bool, GateError> {
        let current = match self.max_access_level {
            Some(stage) => self.authoritative_level(stage)?,
            None => self.initialize()?,
        };
        if level <= current {
            return Ok(false);
        }
        self.persist(level)?;
        self.max_access_level = Some(level);
        tracing::info!(from = %current, to = %level, "stage progress advanced");
        Ok(true)
    }

    /// Back to the first stage, persisted, navigating there (push) unless
    /// already on its path.
    pub fn reset_progress<N>(&mut self, navigator: &mut N) -> Result<(), GateError>
    where
        N: Navigator + ?Sized,
    {
        let initial = Stage::initial();
        self.persist(initial)?;
        self.max_access_level = Some(initial);
        tracing::info!("stage progress reset");

        let first_path = self.routes.path(initial);
        if navigator.location() != first_path {
            navigator.navigate(first_path, NavigationMode::Push);
        }
        Ok(())
    }

    /// Whether `stage` is at or below the in-memory max level.
    pub fn can_access(&self, stage: Stage) -> bool {
        self.max_access_level.is_some_and(|max| stage <= max)
    }

    pub fn accessible_stages(&self) -> Vec<Stage> {
        Stage::all()
            .iter()
            .copied()
            .filter(|s| self.can_access(*s))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Persistence helpers
    // -----------------------------------------------------------------------

    fn read_persisted(&self) -> Result<Option<Stage>, GateError> {
        let Some(raw) = self.store.get(PROGRESS_KEY)? else {
            return Ok(None);
        };
        match Stage::parse_persisted(&raw) {
            Some(stage) => Ok(Some(stage)),
            None => {
                tracing::warn!(value = %raw, "ignoring invalid persisted stage progress");
                Ok(None)
            }
        }
    }

    /// `max(in_memory, persisted)`, adopted as the new in-memory value.
    fn authoritative_level(&mut self, in_memory: Stage) -> Result<Stage, GateError> {
        let level = match self.read_persisted()? {
            Some(persisted) => in_memory.max(persisted),
            None => in_memory,
        };
        self.max_access_level = Some(level);
        Ok(level)
    }

    fn persist(&self, stage: Stage) -> Result<(), GateError> {
        self.store.set(PROGRESS_KEY, &stage.to_persisted())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::History;
    use practica_core::MemoryStore;

    fn gate_with(value: Option<&str>) -> StageGate<MemoryStore> {
        let store = match value {
            Some(v) => MemoryStore::with_entries([(PROGRESS_KEY, v)]),
            None => MemoryStore::new(),
        };
        StageGate::with_default_routes(store)
    }

    #[test]
    fn uninitialised_gate_is_loading_and_does_not_navigate() {
        let mut gate = gate_with(Some("0"));
        let mut history = History::new("/coordinacion/notificar-estudiantes");
        let decision = gate
            .evaluate_and_redirect("/coordinacion/notificar-estudiantes", &mut history)
            .unwrap();
        assert_eq!(decision, GateDecision::Loading);
        assert_eq!(history.entries().len(), 1);
        assert!(!gate.is_initialized());
    }

    #[test]
    fn initialize_defaults_to_first_stage() {
        let mut gate = gate_with(None);
        assert_eq!(gate.initialize().unwrap(), Stage::StudentSelection);
    }

    #[test]
    fn initialize_reads_persisted_stage() {
        let mut gate = gate_with(Some("2"));
        assert_eq!(gate.initialize().unwrap(), Stage::StudentNotification);
    }

    #[test]
    fn advance_before_initialize_initialises_first() {
        let mut gate = gate_with(Some("1"));
        assert!(!gate.advance_stage(Stage::StudentSelection).unwrap());
        assert_eq!(gate.max_access_level(), Some(Stage::InstitutionNotification));
    }

    #[test]
    fn accessible_stages_follow_max_level() {
        let mut gate = gate_with(Some("1"));
        assert!(gate.accessible_stages().is_empty());
        gate.initialize().unwrap();
        assert_eq!(
            gate.accessible_stages(),
            vec![Stage::StudentSelection, Stage::InstitutionNotification]
        );
        assert!(!gate.can_access(Stage::StudentNotification));
    }

    #[test]
    fn ungated_location_is_left_alone() {
        let mut gate = gate_with(None);
        gate.initialize().unwrap();
        let mut history = History::new("/estudiantes");
        let decision = gate.evaluate_and_redirect("/estudiantes", &mut history).unwrap();
        assert_eq!(decision, GateDecision::Ungated);
        assert_eq!(history.entries(), ["/estudiantes".to_string()]);
    }
}
