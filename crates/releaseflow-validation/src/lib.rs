//! ReleaseFlow Validation - Input validation and sanitization.
//!
//! Pure, stateless checks over untrusted strings: injection and markup
//! classifiers, HTML-entity sanitization, and format/length validators for
//! the inputs the application accepts (emails, URLs, titles, file names,
//! passwords).
//!
//! The SQL classifier is defense-in-depth only. The data layer must still
//! use parameterized queries.
//!
//! # Example
//!
//! ```rust
//! use releaseflow_validation::{InputType, InputValidator};
//!
//! let validator = InputValidator::new();
//! assert!(validator.contains_sql_injection("'; DROP TABLE projects; --"));
//!
//! let outcome = validator.validate("Summer <EP>", InputType::ProjectTitle);
//! assert_eq!(outcome.sanitized_input.as_deref(), Some("Summer &lt;EP&gt;"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod password;
pub mod types;
pub mod validator;

pub use error::{Result, ValidationError};
pub use password::{PasswordStrength, PasswordValidation};
pub use types::{InputType, ValidationOutcome};
pub use validator::InputValidator;
