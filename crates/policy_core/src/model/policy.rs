//! Policy domain model.
//!
//! # Responsibility
//! - Define the insert shape, the stored row and the read-view of a policy.
//! - Validate field-level creation rules in a fixed order.
//!
//! # Invariants
//! - `policy_number` is unique across all stored policies (enforced by storage).
//! - `premium` is strictly positive for every stored policy.
//! - `start_date` lies within the creation-time window of `today ± 10 years`.
//!
//! # See also
//! - `crate::service::policy_service` for the full, ordered validation chain.

use crate::model::date::{deserialize_flexible, start_date_window};
use crate::model::note::Note;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::{self, Unexpected, Visitor};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-assigned policy identity.
pub type PolicyId = i64;

/// Monetary premium as an exact decimal amount.
///
/// JSON numbers are read through their shortest textual form, so `19.999`
/// stays `19.999` and `0.004` stays positive. Amounts that do not fit a
/// 96-bit decimal are rejected at deserialization instead of saturating.
/// Serialized as a JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Premium(Decimal);

impl Premium {
    pub fn from_major(major: i64) -> Self {
        Self(Decimal::from(major))
    }

    /// `minor` hundredths of the major unit.
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl Display for Premium {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Premium {
    type Err = rust_decimal::Error;

    /// Parses the stored text form; never rounds.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(text.trim()).map(Self)
    }
}

impl Serialize for Premium {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Parsing the text form yields the nearest `f64` to the exact amount.
        let amount: f64 = self.0.to_string().parse().map_err(S::Error::custom)?;
        serializer.serialize_f64(amount)
    }
}

impl<'de> Deserialize<'de> for Premium {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PremiumVisitor)
    }
}

struct PremiumVisitor;

impl<'de> Visitor<'de> for PremiumVisitor {
    type Value = Premium;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("a decimal premium amount")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Premium, E> {
        Ok(Premium(Decimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Premium, E> {
        Ok(Premium(Decimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Premium, E> {
        // `f64`'s Display is the shortest round-trip form and never uses an exponent.
        value
            .to_string()
            .parse()
            .map_err(|_| E::invalid_value(Unexpected::Float(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Premium, E> {
        value
            .parse()
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }
}

/// Validation failure for policy creation.
///
/// `Display` renders the exact client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyValidationError {
    DuplicatePolicyNumber,
    MissingPolicyNumber,
    NonPositivePremium,
    StartDateOutOfRange {
        start_date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },
}

impl PolicyValidationError {
    /// Client-facing message, exposed verbatim at the HTTP boundary.
    pub fn message(&self) -> &'static str {
        match self {
            Self::DuplicatePolicyNumber => "A policy with this policy number already exists.",
            Self::MissingPolicyNumber => "Policy number is required.",
            Self::NonPositivePremium => "Premium must be greater than zero.",
            Self::StartDateOutOfRange { .. } => {
                "Start date must be within the last 10 years or next 10 years."
            }
        }
    }

    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicatePolicyNumber => "duplicate_policy_number",
            Self::MissingPolicyNumber => "missing_policy_number",
            Self::NonPositivePremium => "non_positive_premium",
            Self::StartDateOutOfRange { .. } => "start_date_out_of_range",
        }
    }
}

impl Display for PolicyValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for PolicyValidationError {}

fn unset_start_date() -> NaiveDate {
    NaiveDate::MIN
}

/// Creation input for a policy.
///
/// Absent JSON fields fall back to values that fail their own validation
/// rule (empty number, zero premium, minimum date).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicy {
    #[serde(default)]
    pub policy_number: String,
    #[serde(default)]
    pub premium: Premium,
    #[serde(
        default = "unset_start_date",
        deserialize_with = "deserialize_flexible"
    )]
    pub start_date: NaiveDate,
}

impl NewPolicy {
    pub fn new(policy_number: impl Into<String>, premium: Premium, start_date: NaiveDate) -> Self {
        Self {
            policy_number: policy_number.into(),
            premium,
            start_date,
        }
    }

    /// Runs the field-level rules in order; the first failure wins.
    ///
    /// Order: presence of `policy_number`, positive `premium`, `start_date`
    /// within `today ± 10 years` (inclusive).
    pub fn validate(&self, today: NaiveDate) -> Result<(), PolicyValidationError> {
        if self.policy_number.trim().is_empty() {
            return Err(PolicyValidationError::MissingPolicyNumber);
        }

        if !self.premium.is_positive() {
            return Err(PolicyValidationError::NonPositivePremium);
        }

        let (earliest, latest) = start_date_window(today);
        if self.start_date < earliest || self.start_date > latest {
            return Err(PolicyValidationError::StartDateOutOfRange {
                start_date: self.start_date,
                earliest,
                latest,
            });
        }

        Ok(())
    }
}

/// Stored policy row without its notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub id: PolicyId,
    pub policy_number: String,
    pub premium: Premium,
    pub start_date: NaiveDate,
}

/// Read-view returned by every policy read use-case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    pub id: PolicyId,
    pub policy_number: String,
    pub premium: Premium,
    pub start_date: NaiveDate,
    /// Exactly the notes whose `policy_id` equals `id`, in id order.
    pub notes: Vec<Note>,
}

impl PolicyRecord {
    pub fn from_policy(policy: Policy, notes: Vec<Note>) -> Self {
        Self {
            id: policy.id,
            policy_number: policy.policy_number,
            premium: policy.premium,
            start_date: policy.start_date,
            notes,
        }
    }
}
