//! Infobox extraction from article wikitext.
//!
//! Finds the first `{{Infobox …}}` template in a page's lead section and returns
//! its recognized fields as a [`RawFieldMap`] keyed by canonical field name.
//! Values are left as raw markup; cleaning happens downstream.

pub mod aliases;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, trace};

use chronicle_shared::RawFieldMap;
use chronicle_text::markup::{named_arg, split_top_level};

pub use aliases::{CANONICAL_FIELDS, canonical_field, normalize_label};

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches the opening of an infobox template.
static INFOBOX_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\{\s*infobox\b").expect("infobox regex"));

/// HTML comments can hide pipes and braces that would break splitting.
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?(?:-->|$)").expect("comment regex"));

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract the recognized fields of the first infobox in `raw`.
///
/// Never fails. Input without an infobox yields an empty map, and an infobox
/// with unbalanced braces is read to the end of the input.
#[instrument(skip_all, fields(len = raw.len()))]
pub fn extract(raw: &str) -> RawFieldMap {
    let mut fields = RawFieldMap::new();

    let text = COMMENT_RE.replace_all(raw, "");
    let Some(body) = infobox_body(&text) else {
        debug!("no infobox found");
        return fields;
    };

    // The first part is the template name (`Infobox scientist`).
    for entry in split_top_level(body, b'|').into_iter().skip(1) {
        let Some((label, value)) = named_arg(entry) else {
            trace!(entry = entry.trim(), "skipping malformed infobox entry");
            continue;
        };
        let Some(field) = canonical_field(label) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        fields
            .entry(field.to_string())
            .or_insert_with(|| value.to_string());
    }

    debug!(fields = fields.len(), "infobox extracted");
    fields
}

/// Return the text between the infobox's opening `{{` and its matching `}}`.
fn infobox_body(text: &str) -> Option<&str> {
    let start = INFOBOX_OPEN_RE.find(text)?.start();
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes.get(i..i + 2) {
            Some(b"{{") => {
                depth += 1;
                i += 2;
            }
            Some(b"}}") => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start + 2..i]);
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    Some(&text[start + 2..])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EINSTEIN: &str = r#"{{Short description|German-born physicist (1879–1955)}}
{{Infobox scientist
| name               = Albert Einstein
| image              = Einstein 1921 by F Schmutzer - restoration.jpg
| birth_date         = {{Birth date|df=y|1879|3|14}}
| birth_place        = [[Ulm]], [[Kingdom of Württemberg]], [[German Empire]]
| death_date         = {{Death date and age|df=y|1955|4|18|1879|3|14}}
| death_place        = [[Princeton, New Jersey]], U.S.
| citizenship        = {{Plainlist|
* [[Kingdom of Württemberg]] (1879–1896)
* [[Switzerland]] (1901–1955)
}}
| fields             = [[Physics]], [[philosophy]]
| occupation         = [[Physicist]]
}}
'''Albert Einstein''' was a [[theoretical physicist]]."#;

    #[test]
    fn extracts_canonical_fields() {
        let fields = extract(EINSTEIN);
        assert_eq!(fields.get("name").map(String::as_str), Some("Albert Einstein"));
        assert_eq!(
            fields.get("birth_date").map(String::as_str),
            Some("{{Birth date|df=y|1879|3|14}}")
        );
        assert_eq!(
            fields.get("birth_place").map(String::as_str),
            Some("[[Ulm]], [[Kingdom of Württemberg]], [[German Empire]]")
        );
        assert_eq!(fields.get("occupation").map(String::as_str), Some("[[Physicist]]"));
        assert!(fields.get("nationality").is_some_and(|v| v.starts_with("{{Plainlist|")));
        assert!(!fields.contains_key("image"));
        assert!(!fields.contains_key("fields"));
        assert_eq!(fields.len(), 7);
    }

    #[test]
    fn nested_pipes_do_not_split_entries() {
        let fields = extract("{{Infobox person|name=A|birth_place=[[Ulm|Ulm, Germany]]}}");
        assert_eq!(
            fields.get("birth_place").map(String::as_str),
            Some("[[Ulm|Ulm, Germany]]")
        );
    }

    #[test]
    fn first_alias_occurrence_wins() {
        let fields = extract("{{Infobox person|born=1879|birth_date=1880}}");
        assert_eq!(fields.get("birth_date").map(String::as_str), Some("1879"));
    }

    #[test]
    fn malformed_and_empty_entries_dropped() {
        let fields = extract("{{infobox royalty|name=|=orphan|just text|died = 1066|spouse=X}}");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("death_date").map(String::as_str), Some("1066"));
    }

    #[test]
    fn no_infobox_yields_empty_map() {
        assert!(extract("").is_empty());
        assert!(extract("{{Short description|x}} plain article text").is_empty());
    }

    #[test]
    fn unbalanced_braces_run_to_end() {
        let fields = extract("{{Infobox person\n| name = Hypatia\n| birth_date = c. 350–370");
        assert_eq!(fields.get("name").map(String::as_str), Some("Hypatia"));
        assert_eq!(fields.get("birth_date").map(String::as_str), Some("c. 350–370"));
    }

    #[test]
    fn comments_are_ignored() {
        let fields = extract("{{Infobox person|name=Socrates<!-- | died = x }} -->|died=399 BC}}");
        assert_eq!(fields.get("name").map(String::as_str), Some("Socrates"));
        assert_eq!(fields.get("death_date").map(String::as_str), Some("399 BC"));
    }
}
