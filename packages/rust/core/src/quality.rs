//! Completeness and consistency scoring for assembled biographies.

use std::collections::BTreeSet;

use serde::Serialize;

use chronicle_shared::{QualityWeights, StructuredDate, Tag};

/// Summaries shorter than this (in characters) draw a warning.
pub const MIN_SUMMARY_CHARS: usize = 50;

pub const WARN_SHORT_SUMMARY: &str = "summary is very short";
pub const WARN_NO_DATES: &str = "no date information available";
pub const WARN_NO_OCCUPATION: &str = "no occupation information";
pub const WARN_DEATH_BEFORE_BIRTH: &str = "death date precedes birth date";

/// Transformed fields awaiting validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiographyDraft {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub birth_date: Option<StructuredDate>,
    pub death_date: Option<StructuredDate>,
    pub birth_place: Option<String>,
    pub death_place: Option<String>,
    pub occupations: BTreeSet<String>,
    pub nationality: Option<String>,
    pub categories: BTreeSet<Tag>,
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// In `[0, 1]`.
    pub quality_score: f64,
    /// In detection order.
    pub warnings: Vec<String>,
}

/// Score a draft and collect its warnings. Never fails.
///
/// The score is the sum of the weights of the present fields divided by the
/// sum of all field weights, minus the inconsistency penalty when the death
/// date precedes the birth date. It is clamped to `[0, 1]` and rounded to
/// three decimals.
pub fn validate(draft: &BiographyDraft, weights: &QualityWeights) -> Assessment {
    let mut warnings = Vec::new();
    let mut earned = 0.0;

    let name = present(&draft.name);
    let summary = present(&draft.summary);

    if name {
        earned += weights.name;
    } else {
        warnings.push("missing required field: name".to_string());
    }
    if let Some(text) = draft.summary.as_deref().filter(|_| summary) {
        earned += weights.summary;
        if text.chars().count() < MIN_SUMMARY_CHARS {
            warnings.push(WARN_SHORT_SUMMARY.to_string());
        }
    } else {
        warnings.push("missing required field: summary".to_string());
    }

    let optional = [
        (draft.birth_date.is_some(), weights.birth_date),
        (draft.death_date.is_some(), weights.death_date),
        (present(&draft.birth_place), weights.birth_place),
        (present(&draft.death_place), weights.death_place),
        (!draft.occupations.is_empty(), weights.occupations),
        (present(&draft.nationality), weights.nationality),
        (!draft.categories.is_empty(), weights.categories),
    ];
    earned += optional
        .iter()
        .filter(|(is_present, _)| *is_present)
        .map(|(_, weight)| weight)
        .sum::<f64>();

    if draft.birth_date.is_none() && draft.death_date.is_none() {
        warnings.push(WARN_NO_DATES.to_string());
    }
    if draft.occupations.is_empty() {
        warnings.push(WARN_NO_OCCUPATION.to_string());
    }

    let total = weights.field_total();
    let mut score = if total > 0.0 { earned / total } else { 0.0 };

    if let (Some(birth), Some(death)) = (&draft.birth_date, &draft.death_date) {
        if death.precedes(birth) {
            warnings.push(WARN_DEATH_BEFORE_BIRTH.to_string());
            score -= weights.inconsistency_penalty;
        }
    }

    Assessment {
        quality_score: round3(score.clamp(0.0, 1.0)),
        warnings,
    }
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
