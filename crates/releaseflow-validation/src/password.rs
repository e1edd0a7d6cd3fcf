//! Password strength scoring.

use serde::{Deserialize, Serialize};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Coarse password strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PasswordStrength {
    /// Too short or too uniform; rejected
    Weak,
    /// Long enough with three of four character classes
    Medium,
    /// Long enough with all four character classes
    Strong,
}

/// Detailed result of a password check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PasswordValidation {
    /// Whether the password is acceptable
    pub is_valid: bool,
    /// Overall strength
    pub strength: PasswordStrength,
    /// At least [`MIN_PASSWORD_LENGTH`] characters
    pub min_length: bool,
    /// Contains an uppercase letter
    pub has_upper_case: bool,
    /// Contains a lowercase letter
    pub has_lower_case: bool,
    /// Contains a digit
    pub has_digit: bool,
    /// Contains a symbol
    pub has_special_char: bool,
    /// Number of satisfied criteria, 0-5
    pub score: u8,
}

impl PasswordValidation {
    /// Score a password.
    ///
    /// Strength grows with length and character-class diversity. A password
    /// under the minimum length is always `Weak` regardless of diversity.
    #[must_use]
    pub fn evaluate(password: &str) -> Self {
        let min_length = password.chars().count() >= MIN_PASSWORD_LENGTH;
        let has_upper_case = password.chars().any(char::is_uppercase);
        let has_lower_case = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_special_char = password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

        let score = [
            min_length,
            has_upper_case,
            has_lower_case,
            has_digit,
            has_special_char,
        ]
        .iter()
        .filter(|met| **met)
        .count();
        #[allow(clippy::cast_possible_truncation)]
        let score = score as u8;

        let strength = match score {
            _ if !min_length => PasswordStrength::Weak,
            5 => PasswordStrength::Strong,
            4 => PasswordStrength::Medium,
            _ => PasswordStrength::Weak,
        };

        Self {
            is_valid: strength != PasswordStrength::Weak,
            strength,
            min_length,
            has_upper_case,
            has_lower_case,
            has_digit,
            has_special_char,
            score,
        }
    }
}
