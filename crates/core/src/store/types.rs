//! Wire types of the store functions.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::registration::{check_registration, FieldError};

// ============================================================================
// Profile
// ============================================================================

/// Student profile as returned by `get-student-info-by-auth`.
///
/// Missing or `null` text fields read as empty strings. `year_of_passing`
/// and `guest_count` come back as numbers from some deployments and as
/// strings from others.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub roll_no: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub programme: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year_of_passing: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_registered: bool,
    #[serde(
        default,
        deserialize_with = "lenient_opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub guest_count: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub guardian1: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub guardian2: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub pass_id: Option<String>,
}

// ============================================================================
// Registration
// ============================================================================

/// Body of `register-student-by-auth`.
///
/// Unused guardian slots are sent as `null`, never as `""`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub guest_count: i64,
    pub guest_1_name: Option<String>,
    pub guest_2_name: Option<String>,
}

impl RegistrationRequest {
    /// Re-run the registration field rules against a received request.
    ///
    /// The client checks its draft before sending; whoever accepts the
    /// request has to apply the same checks because the client is not the
    /// authority.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors = check_registration(
            Some(self.guest_count),
            self.guest_1_name.as_deref().unwrap_or(""),
            self.guest_2_name.as_deref().unwrap_or(""),
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// Raw response of `get-qr`. Every field may be missing; completeness is
/// checked when it is turned into a [`crate::ticket::TicketRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketPayload {
    #[serde(
        rename = "qrSvgString",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub qr_svg: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub roll_no: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub guest_1_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub guest_2_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub programme: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub year_of_passing: Option<String>,
}

/// `{ "error": "..." }` body of a rejected call.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Lenient field parsing
// ============================================================================

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string).unwrap_or_default())
}

/// `null`, missing and empty all read as `None`.
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(scalar_to_string)
        .filter(|s| !s.trim().is_empty()))
}

/// A number or a numeric string; `null`, missing and blank read as `None`.
fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("guest count {} is not an integer", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("guest count '{}' is not an integer", s))),
        Some(other) => Err(D::Error::custom(format!(
            "guest count {} is not an integer",
            other
        ))),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
