use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::ApiError;

pub static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern compiles")
});

pub static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$")
        .expect("url pattern compiles")
});

static SLUG_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("slug pattern compiles"));
static SLUG_DASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").expect("slug pattern compiles"));

/// Collects field messages and reports them together
#[derive(Debug, Default)]
pub struct Validator {
    messages: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.messages.push(message.to_string());
        }
        self
    }

    /// Present and not blank
    pub fn required(&mut self, value: Option<&str>, message: &str) -> &mut Self {
        self.check(value.map(|v| !v.trim().is_empty()).unwrap_or(false), message)
    }

    pub fn max_len(&mut self, value: Option<&str>, max: usize, message: &str) -> &mut Self {
        self.check(value.map(|v| v.chars().count() <= max).unwrap_or(true), message)
    }

    /// Absent values pass; present ones must match
    pub fn pattern(&mut self, value: Option<&str>, re: &Regex, message: &str) -> &mut Self {
        self.check(value.map(|v| re.is_match(v)).unwrap_or(true), message)
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_errors(std::mem::take(&mut self.messages)))
        }
    }
}

/// URL-safe lowercase slug: "Devworks Bootcamp!" → "devworks-bootcamp"
pub fn slugify(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(&lower, "");
    SLUG_DASH_RE.replace_all(stripped.trim(), "-").trim_matches('-').to_string()
}

/// Malformed ids are reported the same way as missing ones
pub fn parse_id(resource: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| not_found(resource, raw))
}

pub fn not_found(resource: &str, id: impl std::fmt::Display) -> ApiError {
    ApiError::not_found(format!("{} not found with id of {}", resource, id))
}

/// Trimmed copy, `None` when blank
pub fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
