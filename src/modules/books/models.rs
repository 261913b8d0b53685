use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Physical condition of a book handed in for intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    AsNew,
    Damaged,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::New, Condition::AsNew, Condition::Damaged];

    /// Multiplier applied to the base price.
    pub const fn coefficient(self) -> f64 {
        match self {
            Condition::New => 1.0,
            Condition::AsNew => 0.8,
            Condition::Damaged => 0.5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::AsNew => "as_new",
            Condition::Damaged => "damaged",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown condition '{0}'")]
pub struct ConditionParseError(pub String);

impl FromStr for Condition {
    type Err = ConditionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|condition| condition.as_str() == value)
            .ok_or_else(|| ConditionParseError(value.to_string()))
    }
}

/// Body of `POST /api/books`.
///
/// Both fields are optional at the wire level so that a missing field is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

/// Record produced by a book intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub isbn10: String,
    pub isbn13: String,
    pub condition: Condition,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_price"
    )]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub needs_manual_completion: bool,
}

/// Whole prices go out as integers (`4004`, not `4004.0`).
fn serialize_price<S: Serializer>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match *price {
        Some(value) if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER => {
            serializer.serialize_i64(value as i64)
        }
        Some(value) => serializer.serialize_f64(value),
        None => serializer.serialize_none(),
    }
}

// 2^53, the largest range where every integer is an exact f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;
