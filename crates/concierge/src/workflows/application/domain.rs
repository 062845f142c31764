use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Rupee amount held in paise so fee arithmetic stays exact.
///
/// The backend transmits rupee decimals (sometimes quoted); the payment
/// gateway wants minor units. Both conversions live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money {
    paise: u64,
}

impl Money {
    pub const ZERO: Money = Money { paise: 0 };

    pub const fn from_paise(paise: u64) -> Self {
        Self { paise }
    }

    pub const fn from_rupees(rupees: u64) -> Self {
        Self {
            paise: rupees * 100,
        }
    }

    /// Minor units, as the payment gateway expects them.
    pub const fn paise(self) -> u64 {
        self.paise
    }

    pub const fn is_zero(self) -> bool {
        self.paise == 0
    }

    /// Half the amount, rounded up to the nearest paisa.
    pub const fn halved_rounding_up(self) -> Self {
        Self {
            paise: self.paise.div_ceil(2),
        }
    }

    /// Parse a rupee decimal such as `"1000"`, `"1000.5"`, or `"1000.50"`.
    pub fn parse_rupees(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };

        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let rupees: u64 = whole.parse().ok()?;
        let mut paise: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().ok()? * 10,
            _ => fraction.parse().ok()?,
        };
        paise = rupees.checked_mul(100)?.checked_add(paise)?;
        Some(Self { paise })
    }

    fn from_rupee_float(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        Some(Self {
            paise: (value * 100.0).round() as u64,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rupees = self.paise / 100;
        let fraction = self.paise % 100;
        if fraction == 0 {
            write!(f, "{rupees}")
        } else {
            write!(f, "{rupees}.{fraction:02}")
        }
    }
}

impl Serialize for Money {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Money::from_rupee_float(value)
                .ok_or_else(|| de::Error::custom("amount must be a non-negative rupee decimal")),
            Raw::Text(text) => Money::parse_rupees(&text)
                .ok_or_else(|| de::Error::custom(format!("unparseable rupee amount '{text}'"))),
        }
    }
}

/// A purchasable government service as fetched from the catalog. Immutable
/// once fetched; the workflow holds a read-only reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub fees: Money,
    #[serde(default)]
    pub doc_require: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub dob_status: bool,
}

impl ServiceDefinition {
    /// Required-document labels: `doc_require` split on commas, trimmed.
    /// Empty or missing means no documents are required.
    pub fn required_documents(&self) -> Vec<String> {
        self.doc_require
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn collects_dob(&self) -> bool {
        self.dob_status
    }

    /// Case-insensitive name/description match used by catalog search.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(&query))
    }
}

/// Accept the 0/1 flags the backend uses for booleans, in whichever encoding
/// the serializer picked that day.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => value,
        Raw::Number(value) => value != 0,
        Raw::Text(text) => matches!(text.trim(), "1" | "true"),
    })
}

/// Backend status codes for a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Submitted,
    Approved,
    DocumentVerification,
    Rejected,
}

impl ApplicationStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Approved,
            2 => Self::DocumentVerification,
            3 => Self::Rejected,
            _ => Self::Submitted,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Application Submitted",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::DocumentVerification => "Document Verification",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        let code = match Raw::deserialize(deserializer)? {
            Raw::Number(code) => code,
            Raw::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("unknown application status '{text}'")))?,
        };
        Ok(Self::from_code(code))
    }
}

/// One row of the user's submitted-application history.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSummary {
    pub id: u64,
    #[serde(default)]
    pub service_name: Option<String>,
    pub application_status: ApplicationStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
}
