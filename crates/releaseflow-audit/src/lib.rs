//! ReleaseFlow Audit - Security event journal.
//!
//! Records threat detections, crypto-operation outcomes, validation failures
//! and session lifecycle transitions. Every event is:
//!
//! 1. appended to a bounded in-memory journal,
//! 2. emitted as a `tracing` event at a level matching its severity,
//! 3. broadcast to live subscribers.
//!
//! Identifiers that could leak account data (user ids, key aliases) are
//! masked before they enter an event.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod logger;

pub use logger::{
    mask_sensitive, SecurityEvent, SecurityEventType, SecurityLevel, SecurityLogger,
    DEFAULT_CAPACITY,
};
