//! Core domain types shared by the Chronicle crates.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// English month names, indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ---------------------------------------------------------------------------
// StructuredDate
// ---------------------------------------------------------------------------

/// Calendar era. BCE years are stored as positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    #[serde(rename = "BCE")]
    Bce,
    #[serde(rename = "CE")]
    Ce,
}

/// How precisely a date is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePrecision {
    /// Day, month and year all known.
    Exact,
    /// Month and year known, no day.
    Month,
    /// Only the year is known.
    YearOnly,
    /// Approximate. Month/day fields keep whatever granularity was given.
    Circa,
}

/// A normalized calendar date as extracted from an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuredDate {
    /// Year magnitude, always >= 1. Read together with `era`.
    pub year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    pub era: Era,
    pub precision: DatePrecision,
}

impl StructuredDate {
    /// Year on a signed axis with no year zero collapsed: 1 BCE = 0, 2 BCE = -1.
    pub fn astronomical_year(&self) -> i64 {
        match self.era {
            Era::Ce => i64::from(self.year),
            Era::Bce => 1 - i64::from(self.year),
        }
    }

    /// Compare at the granularity both dates share.
    ///
    /// Returns `None` when the dates cannot be ordered at that granularity
    /// (same year, and one of them lacks a month).
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match self.astronomical_year().cmp(&other.astronomical_year()) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
        let (Some(m1), Some(m2)) = (self.month, other.month) else {
            return None;
        };
        match m1.cmp(&m2) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
        match (self.day, other.day) {
            (Some(d1), Some(d2)) => Some(d1.cmp(&d2)),
            _ => None,
        }
    }

    /// True only when `self` is known to fall strictly before `other`.
    pub fn precedes(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Less)
    }

    /// Whole years between two dates, ignoring month/day.
    pub fn years_until(&self, later: &Self) -> i64 {
        later.astronomical_year() - self.astronomical_year()
    }
}

impl std::fmt::Display for StructuredDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.precision == DatePrecision::Circa {
            write!(f, "c. ")?;
        }
        if let Some(day) = self.day {
            write!(f, "{day} ")?;
        }
        if let Some(month) = self.month {
            let name = MONTH_NAMES
                .get(usize::from(month).saturating_sub(1))
                .copied()
                .unwrap_or("?");
            write!(f, "{name} ")?;
        }
        write!(f, "{}", self.year)?;
        if self.era == Era::Bce {
            write!(f, " BCE")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Category tag attached to a biography: either a historical period or a domain.
///
/// Variant order is the taxonomy order; sets of tags iterate in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    // Historical periods
    Ancient,
    EarlyMiddleAges,
    HighMiddleAges,
    LateMiddleAges,
    EarlyModern,
    Modern,
    Contemporary,
    // Domains
    Politician,
    Scientist,
    Artist,
    Writer,
    Explorer,
    Military,
    Philosopher,
    Inventor,
    Religious,
    Royalty,
}

impl Tag {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ancient => "Ancient History",
            Self::EarlyMiddleAges => "Early Middle Ages",
            Self::HighMiddleAges => "High Middle Ages",
            Self::LateMiddleAges => "Late Middle Ages",
            Self::EarlyModern => "Early Modern Period",
            Self::Modern => "Modern Period",
            Self::Contemporary => "Contemporary Period",
            Self::Politician => "Politician",
            Self::Scientist => "Scientist",
            Self::Artist => "Artist",
            Self::Writer => "Writer",
            Self::Explorer => "Explorer",
            Self::Military => "Military",
            Self::Philosopher => "Philosopher",
            Self::Inventor => "Inventor",
            Self::Religious => "Religious",
            Self::Royalty => "Royalty",
        }
    }

    pub fn is_period(self) -> bool {
        self <= Self::Contemporary
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Article references and raw payloads
// ---------------------------------------------------------------------------

/// The resolved, unambiguous identity of an encyclopedia article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalReference {
    /// Path form of the title (`Albert_Einstein`).
    pub key: String,
    /// Display title (`Albert Einstein`).
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CanonicalReference {
    pub fn from_title(title: &str) -> Self {
        let title = title.trim().to_string();
        Self {
            key: title.replace(' ', "_"),
            title,
            url: None,
        }
    }
}

/// Geographic position attached to an article, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Article body as returned by the summary endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBody {
    /// Title as reported by the page itself (may differ after redirects).
    pub title: String,
    /// Plain-text lead extract.
    pub text: String,
    pub description: Option<String>,
    pub page_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// `standard`, `disambiguation`, ...
    pub kind: String,
    pub coordinates: Option<Coordinates>,
}

impl PageBody {
    pub fn is_disambiguation(&self) -> bool {
        self.kind.eq_ignore_ascii_case("disambiguation")
    }
}

/// Canonical infobox field name to raw markup value.
pub type RawFieldMap = BTreeMap<String, String>;
