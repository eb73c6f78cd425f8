//! Plain-text normalization and date parsing for encyclopedia markup.
//!
//! [`clean`] strips wiki markup (templates, links, footnotes, HTML, entities)
//! down to readable text. [`parse_date`] turns raw date strings into
//! [`chronicle_shared::StructuredDate`] values.

pub mod dates;
pub mod markup;
mod normalize;

pub use dates::parse_date;

use tracing::trace;

/// Normalize raw markup into plain text.
///
/// Never fails: unrecognized markup degrades to its visible text or is dropped.
/// Idempotent, so `clean(&clean(s)) == clean(s)` for any input.
pub fn clean(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let cleaned = normalize::run_pipeline(raw);
    trace!(raw_len = raw.len(), cleaned_len = cleaned.len(), "text cleaned");
    cleaned
}
