//! Biography record assembly.
//!
//! Turns fetched source material (page body plus raw infobox fields) into a
//! [`BiographyDraft`], and freezes a validated draft into a [`BiographyRecord`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use chronicle_infobox::aliases;
use chronicle_shared::{
    CanonicalReference, ChronicleError, Coordinates, PageBody, RawFieldMap, Result,
    StructuredDate, Tag,
};
use chronicle_text::{clean, parse_date};

use crate::classify::{classify, period_for};
use crate::quality::{Assessment, BiographyDraft};

pub const WARN_DISAMBIGUATION: &str = "resolved page is a disambiguation page";

/// Separators between occupations in a cleaned infobox value.
const OCCUPATION_SEPARATORS: &[char] = &[',', ';', '/', '•', '·', '*'];

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything fetched for one article.
#[derive(Debug, Clone)]
pub struct SourceMaterial {
    pub reference: CanonicalReference,
    pub body: PageBody,
    pub fields: RawFieldMap,
}

/// Result of the transform stage.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub draft: BiographyDraft,
    /// Warnings raised while transforming, in detection order.
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Clean, parse and classify the raw fields.
///
/// Per-field problems become warnings. Fails only when neither the body nor
/// the description yields a summary, or no name can be found at all.
#[instrument(skip_all, fields(title = %material.reference.title))]
pub fn transform(material: &SourceMaterial) -> Result<Transformed> {
    let mut warnings = Vec::new();
    let fields = &material.fields;

    if material.body.is_disambiguation() {
        warnings.push(WARN_DISAMBIGUATION.to_string());
    }

    let name = cleaned_field(fields, aliases::NAME)
        .or_else(|| non_empty(clean(&material.reference.title)))
        .or_else(|| non_empty(clean(&material.body.title)))
        .ok_or_else(|| ChronicleError::pipeline("article has no usable name"))?;

    let summary = non_empty(clean(&material.body.text))
        .or_else(|| {
            material
                .body
                .description
                .as_deref()
                .and_then(|d| non_empty(clean(d)))
        })
        .ok_or_else(|| {
            ChronicleError::pipeline(format!(
                "article '{}' has no summary text",
                material.reference.title
            ))
        })?;

    let birth_date = date_field(fields, aliases::BIRTH_DATE, "birth", &mut warnings);
    let death_date = date_field(fields, aliases::DEATH_DATE, "death", &mut warnings);

    let occupations = fields
        .get(aliases::OCCUPATION)
        .map(|raw| split_occupations(&clean(raw)))
        .unwrap_or_default();

    let mut categories = classify(&classification_text(&summary, &occupations));
    categories.extend(period_for(birth_date.as_ref(), death_date.as_ref()));

    let draft = BiographyDraft {
        name: Some(name),
        summary: Some(summary),
        birth_date,
        death_date,
        birth_place: cleaned_field(fields, aliases::BIRTH_PLACE),
        death_place: cleaned_field(fields, aliases::DEATH_PLACE),
        occupations,
        nationality: cleaned_field(fields, aliases::NATIONALITY),
        categories,
    };

    debug!(
        occupations = draft.occupations.len(),
        categories = draft.categories.len(),
        warnings = warnings.len(),
        "fields transformed"
    );

    Ok(Transformed { draft, warnings })
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn cleaned_field(fields: &RawFieldMap, key: &str) -> Option<String> {
    fields.get(key).and_then(|raw| non_empty(clean(raw)))
}

fn date_field(
    fields: &RawFieldMap,
    key: &str,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<StructuredDate> {
    let raw = fields.get(key)?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = parse_date(raw);
    if parsed.is_none() {
        warnings.push(format!("could not parse {label} date: '{raw}'"));
    }
    parsed
}

/// Split a cleaned occupation value into lower-cased, deduplicated entries.
fn split_occupations(cleaned: &str) -> BTreeSet<String> {
    cleaned
        .split(OCCUPATION_SEPARATORS)
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

fn classification_text(summary: &str, occupations: &BTreeSet<String>) -> String {
    let mut text = summary.to_string();
    for occupation in occupations {
        text.push_str(". ");
        text.push_str(occupation);
    }
    text
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// An assembled, validated biography. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiographyRecord {
    name: String,
    birth_date: Option<StructuredDate>,
    death_date: Option<StructuredDate>,
    birth_place: Option<String>,
    death_place: Option<String>,
    occupations: BTreeSet<String>,
    nationality: Option<String>,
    categories: BTreeSet<Tag>,
    summary: String,
    quality_score: f64,
    warnings: Vec<String>,
    description: Option<String>,
    page_url: Option<String>,
    image_url: Option<String>,
    /// Summary page type (`standard`, `disambiguation`, ...).
    page_type: String,
    coordinates: Option<Coordinates>,
    age_at_death: Option<u32>,
    reference: CanonicalReference,
    retrieved_at: DateTime<Utc>,
}

impl BiographyRecord {
    /// Freeze a transformed and validated draft.
    ///
    /// Transform warnings come first, then validation warnings.
    pub fn from_parts(
        material: SourceMaterial,
        transformed: Transformed,
        assessment: Assessment,
    ) -> Result<Self> {
        let Transformed {
            draft,
            mut warnings,
        } = transformed;
        warnings.extend(assessment.warnings);

        let name = draft
            .name
            .ok_or_else(|| ChronicleError::pipeline("record has no name"))?;
        let summary = draft
            .summary
            .ok_or_else(|| ChronicleError::pipeline("record has no summary"))?;

        let age_at_death = match (&draft.birth_date, &draft.death_date) {
            (Some(birth), Some(death)) => age_at_death(birth, death),
            _ => None,
        };

        let page_url = material
            .body
            .page_url
            .or_else(|| material.reference.url.clone());

        Ok(Self {
            name,
            birth_date: draft.birth_date,
            death_date: draft.death_date,
            birth_place: draft.birth_place,
            death_place: draft.death_place,
            occupations: draft.occupations,
            nationality: draft.nationality,
            categories: draft.categories,
            summary,
            quality_score: assessment.quality_score,
            warnings,
            description: material.body.description,
            page_url,
            image_url: material.body.thumbnail_url,
            page_type: material.body.kind,
            coordinates: material.body.coordinates,
            age_at_death,
            reference: material.reference,
            retrieved_at: Utc::now(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_date(&self) -> Option<&StructuredDate> {
        self.birth_date.as_ref()
    }

    pub fn death_date(&self) -> Option<&StructuredDate> {
        self.death_date.as_ref()
    }

    pub fn birth_place(&self) -> Option<&str> {
        self.birth_place.as_deref()
    }

    pub fn death_place(&self) -> Option<&str> {
        self.death_place.as_deref()
    }

    pub fn occupations(&self) -> &BTreeSet<String> {
        &self.occupations
    }

    pub fn nationality(&self) -> Option<&str> {
        self.nationality.as_deref()
    }

    pub fn categories(&self) -> &BTreeSet<Tag> {
        &self.categories
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn page_url(&self) -> Option<&str> {
        self.page_url.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn page_type(&self) -> &str {
        &self.page_type
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    /// Completed years of life, when both dates allow it.
    pub fn age_at_death(&self) -> Option<u32> {
        self.age_at_death
    }

    pub fn reference(&self) -> &CanonicalReference {
        &self.reference
    }

    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}

/// Whole years between birth and death, subtracting one when the death's
/// month/day falls before the birthday. `None` for inconsistent dates.
fn age_at_death(birth: &StructuredDate, death: &StructuredDate) -> Option<u32> {
    let mut years = birth.years_until(death);
    if let (Some(birth_month), Some(death_month)) = (birth.month, death.month) {
        let before_birthday = match (birth.day, death.day) {
            (Some(birth_day), Some(death_day)) => {
                (death_month, death_day) < (birth_month, birth_day)
            }
            _ => death_month < birth_month,
        };
        if before_birthday {
            years -= 1;
        }
    }
    u32::try_from(years).ok()
}
