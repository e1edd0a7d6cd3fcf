//! Injection classifiers, sanitizers and format validators.

use crate::error::{Result, ValidationError};
use crate::password::PasswordValidation;
use crate::types::{InputType, ValidationOutcome};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_PROJECT_TITLE_LENGTH: usize = 200;
const MAX_TASK_TITLE_LENGTH: usize = 500;
const MAX_DESCRIPTION_LENGTH: usize = 5000;
const MAX_FILE_NAME_LENGTH: usize = 255;
const MAX_SEARCH_QUERY_LENGTH: usize = 500;

const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

const SQL_KEYWORDS: &str =
    "select|insert|update|delete|drop|create|alter|exec|execute|union|declare|truncate|grant|shutdown";

/// Quote or statement separator directly followed by a SQL keyword.
static SQL_BREAKOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"(?i)['";]\s*\)?\s*\b({SQL_KEYWORDS})\b"#)).expect("valid regex")
});

/// `' OR '1'='1`, `" and 1=1` style tautologies.
static SQL_TAUTOLOGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)['"]\s*\b(or|and)\b\s*['"]?[\w]+['"]?\s*=\s*['"]?[\w]+"#)
        .expect("valid regex")
});

static SQL_UNION_SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bunion\s+(all\s+)?select\b").expect("valid regex"));

static SQL_EXTENDED_PROC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(xp|sp)_[a-z]+").expect("valid regex"));

static XSS_EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bon(error|load|click|dblclick|mouseover|mouseout|mouseenter|focus|blur|change|submit|input|keydown|keyup|keypress|abort|toggle|animationstart)\s*=",
    )
    .expect("valid regex")
});

static XSS_SIGNATURES: &[&str] = &[
    "<script",
    "javascript:",
    "vbscript:",
    "<iframe",
    "<embed",
    "<object",
    "eval(",
    "expression(",
    "data:text/html",
];

static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});")
        .expect("valid regex")
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid regex")
});

static FILE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\- .]+\.[A-Za-z0-9]+$").expect("valid regex"));

static API_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("valid regex"));

/// Stateless validator for untrusted strings.
///
/// Every method is pure; the struct exists so the validator can be injected
/// and shared like the other security components.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator;

impl InputValidator {
    /// Create a validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate `input` according to its kind, returning the sanitized form
    /// only when it is accepted.
    #[must_use]
    pub fn validate(&self, input: &str, input_type: InputType) -> ValidationOutcome {
        let is_valid = match input_type {
            InputType::Email => self.is_valid_email(input),
            InputType::Url => self.is_valid_url(input),
            InputType::ProjectTitle => self.is_valid_project_title(input),
            InputType::TaskTitle => self.is_valid_task_title(input),
            InputType::Description => self.is_valid_description(input),
            InputType::FileName => self.is_valid_file_name(input),
        };

        if is_valid {
            ValidationOutcome::valid(self.sanitize_string(input))
        } else {
            ValidationOutcome::invalid()
        }
    }

    /// Heuristic SQL injection classifier.
    ///
    /// Flags comment markers, quotes or `;` adjacent to SQL keywords,
    /// `UNION SELECT`, boolean tautologies and extended stored procedures.
    #[must_use]
    pub fn contains_sql_injection(&self, input: &str) -> bool {
        input.contains("--")
            || input.contains("/*")
            || input.contains("*/")
            || SQL_BREAKOUT.is_match(input)
            || SQL_TAUTOLOGY.is_match(input)
            || SQL_UNION_SELECT.is_match(input)
            || SQL_EXTENDED_PROC.is_match(input)
    }

    /// Detect markup and script-injection signatures.
    #[must_use]
    pub fn contains_xss(&self, input: &str) -> bool {
        let lower = input.to_lowercase();
        XSS_SIGNATURES.iter().any(|sig| lower.contains(sig)) || XSS_EVENT_HANDLER.is_match(input)
    }

    /// HTML-entity-encode `&`, `<`, `>`, `"` and `'`, then trim.
    ///
    /// Existing entities such as `&lt;` or `&#x27;` are kept as-is, so
    /// sanitizing twice yields the same string.
    #[must_use]
    pub fn sanitize_string(&self, input: &str) -> String {
        let trimmed = input.trim();
        let mut out = String::with_capacity(trimmed.len() + trimmed.len() / 4);

        for (idx, c) in trimmed.char_indices() {
            match c {
                '&' if HTML_ENTITY.is_match(&trimmed[idx..]) => out.push('&'),
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                other => out.push(other),
            }
        }

        out
    }

    /// Strip SQL comment sequences, statement separators and control
    /// characters, and double single quotes.
    ///
    /// Not a substitute for parameterized queries.
    #[must_use]
    pub fn sanitize_sql_parameter(&self, input: &str) -> String {
        let mut cleaned: String = input.chars().filter(|c| !c.is_control()).collect();

        // Removing one marker can join the halves of another (`-/**/-`).
        loop {
            let next = cleaned
                .replace("--", "")
                .replace("/*", "")
                .replace("*/", "")
                .replace(';', "");
            if next == cleaned {
                break;
            }
            cleaned = next;
        }

        cleaned.replace('\'', "''").trim().to_string()
    }

    /// Validate an email address.
    #[must_use]
    pub fn is_valid_email(&self, email: &str) -> bool {
        (3..=MAX_EMAIL_LENGTH).contains(&email.len()) && EMAIL_PATTERN.is_match(email)
    }

    /// Validate an absolute `http`/`https` URL with a host.
    #[must_use]
    pub fn is_valid_url(&self, input: &str) -> bool {
        match Url::parse(input) {
            Ok(url) => {
                matches!(url.scheme(), "http" | "https")
                    && url.host_str().is_some_and(|host| !host.is_empty())
            }
            Err(_) => false,
        }
    }

    /// Validate a phone number: 10-15 digits once formatting is removed.
    #[must_use]
    pub fn is_valid_phone(&self, phone: &str) -> bool {
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        (10..=15).contains(&digits)
    }

    /// Validate a project title: 1-200 characters, not blank, no SQL injection.
    #[must_use]
    pub fn is_valid_project_title(&self, title: &str) -> bool {
        is_non_blank_within(title, MAX_PROJECT_TITLE_LENGTH) && !self.contains_sql_injection(title)
    }

    /// Validate a task title: 1-500 characters, not blank, no SQL injection.
    #[must_use]
    pub fn is_valid_task_title(&self, title: &str) -> bool {
        is_non_blank_within(title, MAX_TASK_TITLE_LENGTH) && !self.contains_sql_injection(title)
    }

    /// Validate a description: at most 5000 characters, no SQL injection.
    #[must_use]
    pub fn is_valid_description(&self, description: &str) -> bool {
        description.chars().count() <= MAX_DESCRIPTION_LENGTH
            && !self.contains_sql_injection(description)
    }

    /// Score a password.
    #[must_use]
    pub fn is_valid_password(&self, password: &str) -> PasswordValidation {
        PasswordValidation::evaluate(password)
    }

    /// Validate an uploaded file name.
    ///
    /// Rejects path traversal, separators, hidden files and characters
    /// outside `[A-Za-z0-9_- .]`; an extension is required.
    #[must_use]
    pub fn is_valid_file_name(&self, file_name: &str) -> bool {
        if file_name.is_empty() || file_name.len() > MAX_FILE_NAME_LENGTH {
            return false;
        }
        if file_name.starts_with('.') {
            return false;
        }
        if file_name.contains("..") || file_name.contains('/') || file_name.contains('\\') {
            return false;
        }
        FILE_NAME_PATTERN.is_match(file_name)
    }

    /// Allow-list check for artwork MIME types.
    #[must_use]
    pub fn is_valid_image_mime_type(&self, mime_type: &str) -> bool {
        let normalized = mime_type.trim().to_ascii_lowercase();
        ALLOWED_IMAGE_TYPES.contains(&normalized.as_str())
    }

    /// Validate an upload size: non-empty and at most `max_size_mb` MiB.
    #[must_use]
    pub fn is_valid_file_size(&self, size_bytes: u64, max_size_mb: u64) -> bool {
        let max_bytes = max_size_mb.saturating_mul(1024 * 1024);
        (1..=max_bytes).contains(&size_bytes)
    }

    /// Validate a third-party API key: 32-128 URL-safe characters.
    #[must_use]
    pub fn is_valid_api_key(&self, api_key: &str) -> bool {
        (32..=128).contains(&api_key.len()) && API_KEY_PATTERN.is_match(api_key)
    }

    /// Reject suspicious search queries and sanitize the rest.
    pub fn sanitize_search_query(&self, query: &str) -> Result<String> {
        let length = query.chars().count();
        if length > MAX_SEARCH_QUERY_LENGTH {
            return Err(ValidationError::TooLong {
                max: MAX_SEARCH_QUERY_LENGTH,
                actual: length,
            });
        }
        if self.contains_sql_injection(query) {
            return Err(ValidationError::InjectionDetected("SQL"));
        }
        if self.contains_xss(query) {
            return Err(ValidationError::InjectionDetected("script"));
        }
        Ok(self.sanitize_string(query))
    }
}

fn is_non_blank_within(value: &str, max: usize) -> bool {
    !value.trim().is_empty() && value.chars().count() <= max
}
