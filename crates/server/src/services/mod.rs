//! Business logic services.
//!
//! # Services
//!
//! - `entities` - Entity recognizer clients (HTTP and no-op)
//! - `intake` - Report extraction, storage and acknowledgement

pub mod entities;
pub mod intake;

pub use entities::{EntityError, EntityRecognizer, HttpEntityRecognizer, NoopRecognizer};
pub use intake::{IntakeError, IntakeService};
