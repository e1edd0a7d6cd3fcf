//! Command handlers exposed to the presentation layer.

pub mod security;
pub mod session;
