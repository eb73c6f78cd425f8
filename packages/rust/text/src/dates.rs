//! Date parsing for infobox and free-text date strings.
//!
//! Accepted shapes, after markup cleanup:
//! - infobox templates: `{{birth date|1879|3|14}}`, `{{death date and age|1955|4|18|1879|3|14}}`
//! - `14 March 1879`, `March 14, 1879`, `1879-03-14`
//! - `March 1879`, `1879`
//! - era markers `470 BC`, `AD 79`, `-470`
//! - approximations `c. 1503`, `circa 1503`, `{{circa|1503}}`, `1503?`
//!
//! Anything else, including genuinely ambiguous input such as `1879 or 1880`,
//! yields `None`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::trace;

use chronicle_shared::{DatePrecision, Era, MONTH_NAMES, StructuredDate};

use crate::markup::named_arg;

/// Parse a raw date string into a [`StructuredDate`].
///
/// Returns `None` for empty, unparseable or ambiguous input.
pub fn parse_date(raw: &str) -> Option<StructuredDate> {
    if raw.trim().is_empty() {
        return None;
    }

    if let Some(date) = parse_date_template(raw) {
        return Some(date);
    }

    let parsed = parse_text(&crate::clean(raw));
    if parsed.is_none() {
        trace!(raw, "unparseable date");
    }
    parsed
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Matches the birth/death date template family and captures its arguments.
static DATE_TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\{\{\s*((?:birth|death)[ _-]?(?:date|year)(?:[ _]and[ _]age)?|bda|dda|dob|b-da|d-da)\s*\|([^{}]*)\}\}",
    )
    .expect("date template regex")
});

fn parse_date_template(raw: &str) -> Option<StructuredDate> {
    let caps = DATE_TEMPLATE_RE.captures(raw)?;
    let name = caps[1].to_lowercase();
    let year_only = name.contains("year");

    let positional: Vec<&str> = caps[2]
        .split('|')
        .filter(|arg| named_arg(arg).is_none())
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .collect();

    let first = positional.first()?;
    let Ok(year) = first.parse::<u32>() else {
        // `{{birth date|March 14, 1879}}` carries a free-text date.
        return parse_text(&crate::clean(first));
    };

    let (month, day) = if year_only {
        (None, None)
    } else {
        let month = positional.get(1).and_then(|m| m.parse::<u8>().ok());
        let day = month.and(positional.get(2).and_then(|d| d.parse::<u8>().ok()));
        (month, day)
    };

    let circa = raw[..caps.get(0).map_or(0, |m| m.start())]
        .to_lowercase()
        .contains("c.");
    build(year, month, day, Era::Ce, circa)
}

// ---------------------------------------------------------------------------
// Free text
// ---------------------------------------------------------------------------

static PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("paren regex"));

static LEAD_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:born|died|b\.|d\.|on)\s+").expect("lead word regex"));

static CIRCA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:circa|ca\.|ca|c\.|c|approx\.|approximately|about|around)\s*").expect("circa regex")
});

static CALENDAR_NOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\b(?:o\.s\.|n\.s\.|old style|new style|julian|gregorian)$").expect("calendar regex")
});

static ERA_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(b\.c\.e\.|bce|b\.c\.|bc|c\.e\.|ce|a\.d\.|ad)$").expect("era suffix regex")
});

static ERA_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(a\.d\.|ad|c\.e\.|ce)\s+").expect("era prefix regex"));

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})-(\d{1,2})-(\d{1,2})$").expect("iso regex"));

static DMY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?,?\s+(\d{1,4})$").expect("dmy regex")
});

static MDY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{1,4})$").expect("mdy regex")
});

static MY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)\.?,?\s+(\d{1,4})$").expect("my regex"));

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-)?\s*(\d{1,4})$").expect("year regex"));

fn parse_text(cleaned: &str) -> Option<StructuredDate> {
    let text = PAREN_RE.replace_all(cleaned, " ").to_lowercase();
    let text = LEAD_WORD_RE.replace(text.trim(), "").into_owned();

    // A bare `c` or `ca` only counts when a number or a separator follows.
    let circa_end = CIRCA_RE
        .find(&text)
        .filter(|m| {
            text[m.end()..].starts_with(|c: char| c.is_ascii_digit())
                || m.as_str().ends_with(|c: char| c.is_whitespace() || c == '.')
        })
        .map(|m| m.end());
    let mut circa = circa_end.is_some();
    let mut text = match circa_end {
        Some(end) => text[end..].to_string(),
        None => text,
    };
    if text.ends_with('?') {
        circa = true;
        text.pop();
    }

    let text = trim_punctuation(&text);
    let text = CALENDAR_NOTE_RE.replace(&text, "").into_owned();

    let (era, text) = if let Some(caps) = ERA_SUFFIX_RE.captures(&text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        (Some(era_from_marker(&caps[1])), &text[..start])
    } else if let Some(caps) = ERA_PREFIX_RE.captures(&text) {
        let end = caps.get(0).map_or(0, |m| m.end());
        (Some(era_from_marker(&caps[1])), &text[end..])
    } else {
        (None, text.as_str())
    };
    let text = trim_punctuation(text);

    if let Some(caps) = ISO_RE.captures(&text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return build(year, Some(month), Some(day), era.unwrap_or(Era::Ce), circa);
    }

    if let Some(caps) = DMY_RE.captures(&text) {
        let day = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year = caps[3].parse().ok()?;
        return build(year, Some(month), Some(day), era.unwrap_or(Era::Ce), circa);
    }

    if let Some(caps) = MDY_RE.captures(&text) {
        let month = month_from_name(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        return build(year, Some(month), Some(day), era.unwrap_or(Era::Ce), circa);
    }

    if let Some(caps) = MY_RE.captures(&text) {
        let month = month_from_name(&caps[1])?;
        let year = caps[2].parse().ok()?;
        return build(year, Some(month), None, era.unwrap_or(Era::Ce), circa);
    }

    if let Some(caps) = YEAR_RE.captures(&text) {
        let negative = caps.get(1).is_some();
        let year = caps[2].parse().ok()?;
        let era = match (negative, era) {
            (true, Some(_)) => return None,
            (true, None) => Era::Bce,
            (false, era) => era.unwrap_or(Era::Ce),
        };
        return build(year, None, None, era, circa);
    }

    None
}

fn trim_punctuation(text: &str) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'))
        .to_string()
}

fn era_from_marker(marker: &str) -> Era {
    if marker.starts_with('b') {
        Era::Bce
    } else {
        Era::Ce
    }
}

/// Resolve a month name or its abbreviation (at least three letters).
fn month_from_name(name: &str) -> Option<u8> {
    if name.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|full| full.to_lowercase().starts_with(name))
        .and_then(|index| u8::try_from(index + 1).ok())
}

/// Validate the components and assign the precision tag.
fn build(
    year: u32,
    month: Option<u8>,
    day: Option<u8>,
    era: Era,
    circa: bool,
) -> Option<StructuredDate> {
    if year == 0 {
        return None;
    }
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            return None;
        }
    }
    if let (Some(m), Some(d)) = (month, day) {
        let astronomical = match era {
            Era::Ce => i32::try_from(year).ok()?,
            Era::Bce => 1 - i32::try_from(year).ok()?,
        };
        NaiveDate::from_ymd_opt(astronomical, u32::from(m), u32::from(d))?;
    }

    let precision = match (circa, month, day) {
        (true, _, _) => DatePrecision::Circa,
        (false, Some(_), Some(_)) => DatePrecision::Exact,
        (false, Some(_), None) => DatePrecision::Month,
        (false, None, _) => DatePrecision::YearOnly,
    };

    Some(StructuredDate {
        year,
        month,
        day,
        era,
        precision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(date: &StructuredDate) -> (u32, Option<u8>, Option<u8>) {
        (date.year, date.month, date.day)
    }

    #[test]
    fn empty_input_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
    }

    #[test]
    fn bce_year_only() {
        let date = parse_date("470 BCE").expect("parse");
        assert_eq!(date.year, 470);
        assert_eq!(date.era, Era::Bce);
        assert_eq!(date.precision, DatePrecision::YearOnly);
        assert_eq!(date.month, None);
    }

    #[test]
    fn circa_year() {
        let date = parse_date("c. 1503").expect("parse");
        assert_eq!(date.year, 1503);
        assert_eq!(date.era, Era::Ce);
        assert_eq!(date.precision, DatePrecision::Circa);

        assert_eq!(parse_date("circa 1503"), Some(date));
        assert_eq!(parse_date("{{circa|1503}}"), Some(date));
        assert_eq!(parse_date("1503?"), Some(date));
    }

    #[test]
    fn circa_keeps_granularity() {
        let date = parse_date("c. March 1503").expect("parse");
        assert_eq!(ymd(&date), (1503, Some(3), None));
        assert_eq!(date.precision, DatePrecision::Circa);
    }

    #[test]
    fn full_dates_in_several_shapes() {
        for raw in ["14 March 1879", "March 14, 1879", "1879-03-14", "14th Mar 1879"] {
            let date = parse_date(raw).unwrap_or_else(|| panic!("failed on {raw}"));
            assert_eq!(ymd(&date), (1879, Some(3), Some(14)), "{raw}");
            assert_eq!(date.precision, DatePrecision::Exact);
            assert_eq!(date.era, Era::Ce);
        }
    }

    #[test]
    fn month_and_year() {
        let date = parse_date("April 1955").expect("parse");
        assert_eq!(ymd(&date), (1955, Some(4), None));
        assert_eq!(date.precision, DatePrecision::Month);
    }

    #[test]
    fn era_markers() {
        assert_eq!(parse_date("44 BC").map(|d| (d.year, d.era)), Some((44, Era::Bce)));
        assert_eq!(parse_date("44 B.C.").map(|d| (d.year, d.era)), Some((44, Era::Bce)));
        assert_eq!(parse_date("AD 79").map(|d| (d.year, d.era)), Some((79, Era::Ce)));
        assert_eq!(parse_date("79 CE").map(|d| (d.year, d.era)), Some((79, Era::Ce)));
        assert_eq!(
            parse_date("15 March 44 BC").map(|d| (ymd(&d), d.era)),
            Some(((44, Some(3), Some(15)), Era::Bce))
        );
    }

    #[test]
    fn negative_year_is_bce() {
        let date = parse_date("-470").expect("parse");
        assert_eq!(date.year, 470);
        assert_eq!(date.era, Era::Bce);
        assert_eq!(parse_date("-470 BC"), None);
    }

    #[test]
    fn birth_date_templates() {
        let date = parse_date("{{birth date|df=yes|1879|3|14}}").expect("parse");
        assert_eq!(ymd(&date), (1879, Some(3), Some(14)));
        assert_eq!(date.precision, DatePrecision::Exact);

        let date = parse_date("{{Death date and age|1955|4|18|1879|3|14}}").expect("parse");
        assert_eq!(ymd(&date), (1955, Some(4), Some(18)));

        let date = parse_date("{{birth year and age|1947}}").expect("parse");
        assert_eq!(ymd(&date), (1947, None, None));
        assert_eq!(date.precision, DatePrecision::YearOnly);

        let date = parse_date("{{birth date|March 14, 1879}}").expect("parse");
        assert_eq!(ymd(&date), (1879, Some(3), Some(14)));
    }

    #[test]
    fn markup_around_dates_is_ignored() {
        let date = parse_date("[[14 March]] [[1879]]<ref>Isaacson</ref>").expect("parse");
        assert_eq!(ymd(&date), (1879, Some(3), Some(14)));

        let date = parse_date("18 April 1955 (aged 76)").expect("parse");
        assert_eq!(ymd(&date), (1955, Some(4), Some(18)));

        let date = parse_date("22 February 1732 [O.S. 11 February 1731]").expect("parse");
        assert_eq!(ymd(&date), (1732, Some(2), Some(22)));

        let date = parse_date("born 1643").expect("parse");
        assert_eq!(date.year, 1643);
    }

    #[test]
    fn ambiguous_and_invalid_are_none() {
        assert_eq!(parse_date("1879 or 1880"), None);
        assert_eq!(parse_date("4th century BC"), None);
        assert_eq!(parse_date("unknown"), None);
        assert_eq!(parse_date("0"), None);
        assert_eq!(parse_date("31 February 1900"), None);
        assert_eq!(parse_date("1879-13-01"), None);
        assert_eq!(parse_date("14 Ma 1879"), None);
    }
}
