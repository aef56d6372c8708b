//! Declarative request validation.
//!
//! Each entity declares a static list of [`FieldSpec`]s. [`validate`] checks a raw
//! JSON body against that list and reports every missing field and every malformed
//! field in one [`ValidationErrors`], so a client can fix a form in a single round
//! trip. Only after validation passes is the body deserialized into its typed
//! request struct (see [`validate_into`]).
//!
//! # Presence
//!
//! - [`Presence::Truthy`]: absent, `null`, blank strings, `0` and `false` all count
//!   as missing.
//! - [`Presence::Present`]: only absent and `null` are missing. Used where zero is a
//!   meaningful value, such as an inventory quantity.
//! - [`Presence::Optional`]: never missing; formats are checked when a non-blank
//!   value is supplied.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use utoipa::ToSchema;

static LOOSE_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static STRICT_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static LOCAL_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+94\d{9}$").unwrap());
static NATIONAL_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{9}[vV]|\d{12})$").unwrap());

const MIN_PASSWORD_LENGTH: usize = 10;

/// How a field's absence is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Truthy,
    Present,
    Optional,
}

/// Format rules applied to present fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    /// `local@domain.tld` with no whitespace
    Email,
    /// Email restricted to the usual address characters and an alphabetic TLD
    StrictEmail,
    /// A string of exactly this many ASCII digits
    Digits(usize),
    /// `+94` followed by nine digits
    LocalPhone,
    /// Nine digits and a trailing `V`, or twelve digits
    NationalId,
    /// At least ten characters including a lowercase and an uppercase letter
    Password,
    OneOf(&'static [&'static str]),
    MaxChars(usize),
    PositiveInteger,
    NonNegativeInteger,
    NonNegativeNumber,
    /// A number no greater than this bound
    AtMost(f64),
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// RFC 3339 timestamp or a calendar date
    Timestamp,
}

/// Validation rules for one field of a request body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub presence: Presence,
    pub formats: &'static [Format],
}

impl FieldSpec {
    pub const fn truthy(name: &'static str) -> Self {
        Self {
            name,
            presence: Presence::Truthy,
            formats: &[],
        }
    }

    pub const fn present(name: &'static str) -> Self {
        Self {
            name,
            presence: Presence::Present,
            formats: &[],
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            presence: Presence::Optional,
            formats: &[],
        }
    }

    pub const fn with(self, formats: &'static [Format]) -> Self {
        Self { formats, ..self }
    }
}

/// A field that was supplied but failed a format rule
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "contactNumber")]
    pub field: String,
    #[schema(example = "must be exactly 10 digits")]
    pub message: String,
}

/// Every problem found in a request body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors {
    pub missing_fields: Vec<String>,
    pub invalid_fields: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())?;
        if !self.missing_fields.is_empty() {
            write!(f, ": {}", self.missing_fields.join(", "))?;
        }
        for invalid in &self.invalid_fields {
            write!(f, "; {} {}", invalid.field, invalid.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.missing_fields.is_empty() && self.invalid_fields.is_empty()
    }

    /// Summary message for the response body
    pub fn message(&self) -> &'static str {
        if self.missing_fields.is_empty() {
            "Some fields have invalid values"
        } else {
            "The following fields are required"
        }
    }

    fn invalid(&mut self, field: &str, message: impl Into<String>) {
        self.invalid_fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }
}

/// Check `input` against `specs`, collecting every missing and malformed field.
///
/// A body that is not a JSON object is treated as empty.
pub fn validate(specs: &[FieldSpec], input: &Value) -> Result<(), ValidationErrors> {
    let empty = Map::new();
    let object = input.as_object().unwrap_or(&empty);
    let mut errors = ValidationErrors::default();

    for spec in specs {
        let value = object.get(spec.name);
        if is_missing(value, spec.presence) {
            errors.missing_fields.push(spec.name.to_string());
            continue;
        }
        let Some(value) = value.filter(|v| !is_blank(v)) else {
            continue;
        };
        for format in spec.formats {
            if let Some(message) = check(format, value) {
                errors.invalid(spec.name, message);
                break;
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate `input` then deserialize it into `T`.
///
/// Blank optional fields are dropped before deserialization so that a form that
/// sends `""` for an unset optional field behaves as if it had omitted it.
pub fn validate_into<T: DeserializeOwned>(specs: &[FieldSpec], mut input: Value) -> Result<T, ValidationErrors> {
    validate(specs, &input)?;

    if let Some(object) = input.as_object_mut() {
        for spec in specs.iter().filter(|s| s.presence == Presence::Optional) {
            if object.get(spec.name).is_some_and(|v| v.is_null() || is_blank(v)) {
                object.remove(spec.name);
            }
        }
    }

    serde_json::from_value(input).map_err(|e| {
        let mut errors = ValidationErrors::default();
        errors.invalid("body", e.to_string());
        errors
    })
}

/// Whether a field counts as missing under the given presence rule
pub fn is_missing(value: Option<&Value>, presence: Presence) -> bool {
    match presence {
        Presence::Optional => false,
        Presence::Present => matches!(value, None | Some(Value::Null)),
        Presence::Truthy => match value {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => !b,
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => false,
        },
    }
}

fn is_blank(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.trim().is_empty())
}

/// Numeric value of a JSON number or a numeric string
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn unsigned_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (taken as midnight UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn check(format: &Format, value: &Value) -> Option<String> {
    let ok = match format {
        Format::Email => value.as_str().is_some_and(|s| LOOSE_EMAIL_RE.is_match(s)),
        Format::StrictEmail => value.as_str().is_some_and(|s| STRICT_EMAIL_RE.is_match(s)),
        Format::Digits(n) => value
            .as_str()
            .is_some_and(|s| s.len() == *n && s.chars().all(|c| c.is_ascii_digit())),
        Format::LocalPhone => value.as_str().is_some_and(|s| LOCAL_PHONE_RE.is_match(s)),
        Format::NationalId => value.as_str().is_some_and(|s| NATIONAL_ID_RE.is_match(s)),
        Format::Password => value.as_str().is_some_and(|s| {
            s.chars().count() >= MIN_PASSWORD_LENGTH
                && s.chars().any(|c| c.is_lowercase())
                && s.chars().any(|c| c.is_uppercase())
        }),
        Format::OneOf(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
        Format::MaxChars(max) => value.as_str().is_some_and(|s| s.chars().count() <= *max),
        Format::PositiveInteger => unsigned_of(value).is_some_and(|n| n > 0),
        Format::NonNegativeInteger => unsigned_of(value).is_some(),
        Format::NonNegativeNumber => number_of(value).is_some_and(|n| n >= 0.0),
        Format::AtMost(max) => number_of(value).is_some_and(|n| n <= *max),
        Format::Date => value
            .as_str()
            .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
        Format::Timestamp => value.as_str().is_some_and(|s| parse_timestamp(s).is_some()),
    };
    if ok { None } else { Some(describe(format)) }
}

fn describe(format: &Format) -> String {
    match format {
        Format::Email | Format::StrictEmail => "must be a valid email address".to_string(),
        Format::Digits(n) => format!("must be exactly {n} digits"),
        Format::LocalPhone => "must start with +94 followed by 9 digits".to_string(),
        Format::NationalId => "must be 9 digits followed by V, or 12 digits".to_string(),
        Format::Password => format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters and contain an uppercase and a lowercase letter"
        ),
        Format::OneOf(allowed) => format!("must be one of: {}", allowed.join(", ")),
        Format::MaxChars(max) => format!("must be at most {max} characters"),
        Format::PositiveInteger => "must be a positive integer".to_string(),
        Format::NonNegativeInteger => "must be a non-negative integer".to_string(),
        Format::NonNegativeNumber => "must be a non-negative number".to_string(),
        Format::AtMost(max) => format!("must be at most {max}"),
        Format::Date => "must be a date in YYYY-MM-DD format".to_string(),
        Format::Timestamp => "must be an ISO 8601 date or date-time".to_string(),
    }
}
