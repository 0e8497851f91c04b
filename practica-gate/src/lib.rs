//! # practica-gate
//!
//! Linear progress gate for the coordination workflow
//! (student selection → institution notification → student notification).
//!
//! Build a [`StageGate`] over any [`practica_core::KeyValueStore`], call
//! [`StageGate::initialize`] once, then [`StageGate::evaluate_and_redirect`]
//! on every location change.

pub mod error;
pub mod gate;
pub mod navigation;

pub use error::GateError;
pub use gate::{GateDecision, StageGate, PROGRESS_KEY};
pub use navigation::{History, NavigationMode, Navigator};
