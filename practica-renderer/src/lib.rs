//! # practica-renderer
//!
//! Turns plain-text e-mail templates with placeholders into HTML.
//!
//! ## Usage
//!
//! ```rust
//! use practica_renderer::{render, Placeholders};
//!
//! let html = render(
//!     "Hello\n\n{{TABLE}}\n\nBye [NAME]",
//!     &Placeholders::new().with("{{TABLE}}", "<table></table>"),
//!     &Placeholders::new().with("[NAME]", "Ana"),
//! );
//! assert_eq!(html, "<p>Hello</p>\n<table></table>\n<p>Bye Ana</p>");
//! ```

pub mod catalog;
pub mod email;
pub mod engine;
pub mod error;
pub mod fragments;
pub mod repository;

pub use catalog::{catalog, PlaceholderKind, PlaceholderSpec};
pub use email::{compose, default_template, preview, RenderedEmail};
pub use engine::{render, Placeholders};
pub use error::RenderError;
pub use fragments::FragmentEngine;
pub use repository::TemplateRepository;
