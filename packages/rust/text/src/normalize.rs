//! Markup cleanup pipeline for encyclopedia text.
//!
//! Each cleanup pass is a function `&str -> String` applied in sequence.
//! The sequence is repeated until the text stops changing, which is what makes
//! [`crate::clean`] idempotent: removing one construct can expose another
//! (a link inside a template, a tag split by a comment).

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::markup::{named_arg, split_top_level};

/// Templates that render as a list of their positional arguments.
const LIST_TEMPLATES: &[&str] = &[
    "hlist",
    "flatlist",
    "plainlist",
    "ubl",
    "ubil",
    "unbulleted list",
    "bulleted list",
    "bulletedlist",
    "collapsible list",
    "cslist",
    "enum",
    "ordered list",
];

/// Templates that render as their last positional argument.
const WRAPPER_TEMPLATES: &[&str] = &[
    "nowrap",
    "nobr",
    "small",
    "smaller",
    "big",
    "larger",
    "lang",
    "transl",
    "nobold",
    "noitalic",
    "resize",
    "nowraplinks",
];

/// Templates that mark an approximate year.
const CIRCA_TEMPLATES: &[&str] = &["circa", "c.", "c", "ca.", "ca"];

/// Run the cleanup passes to a fixed point.
///
/// Terminates: no pass raises the count of markup characters (`{}[]<>&`),
/// and a pass that keeps the count never lengthens the text.
pub(crate) fn run_pipeline(raw: &str) -> String {
    let mut current = raw.to_string();

    loop {
        let next = run_round(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn run_round(text: &str) -> String {
    let mut result = strip_comments(text);

    result = strip_references(&result);
    result = decode_entities(&result);
    result = expand_templates(&result);
    result = strip_html_tags(&result);
    result = unwrap_wiki_links(&result);
    result = unwrap_external_links(&result);
    result = strip_bracket_notes(&result);
    result = strip_emphasis(&result);
    result = strip_life_parentheticals(&result);
    result = normalize_whitespace(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: HTML comments
// ---------------------------------------------------------------------------

fn strip_comments(text: &str) -> String {
    static COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?(?:-->|$)").expect("valid regex"));

    COMMENT_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Footnotes
// ---------------------------------------------------------------------------

/// Remove `<ref>…</ref>` footnotes and self-closing `<ref … />` markers.
fn strip_references(text: &str) -> String {
    static SELF_CLOSING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)<ref\b[^>]*/>").expect("valid regex"));
    static PAIRED_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<ref\b[^>]*>.*?</ref\s*>").expect("valid regex")
    });

    let result = SELF_CLOSING_RE.replace_all(text, "");
    PAIRED_RE.replace_all(&result, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: HTML entities
// ---------------------------------------------------------------------------

/// Decode the named and numeric entities that show up in article text.
///
/// Every replacement is no longer than the entity it replaces.
fn decode_entities(text: &str) -> String {
    static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("valid regex")
    });

    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };

            match decoded {
                // Control characters would only turn into whitespace noise.
                Some(c) if c.is_control() => " ".to_string(),
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "nbsp" | "ensp" | "emsp" | "thinsp" => ' ',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "ndash" => '–',
        "mdash" => '—',
        "minus" => '−',
        "hellip" => '…',
        "lsquo" | "rsquo" => '\'',
        "ldquo" | "rdquo" => '"',
        "middot" => '·',
        "deg" => '°',
        _ => return None,
    };
    Some(c)
}

// ---------------------------------------------------------------------------
// Pass 4: Templates
// ---------------------------------------------------------------------------

/// Render `{{…}}` templates from the innermost out: lists become comma-separated
/// items, wrappers keep their text, circa marks become `c. N`, everything else
/// is dropped. Unbalanced braces are left in place.
fn expand_templates(text: &str) -> String {
    static TEMPLATE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid regex"));

    let mut result = text.to_string();
    while TEMPLATE_RE.is_match(&result) {
        result = TEMPLATE_RE
            .replace_all(&result, |caps: &Captures| render_template(&caps[1]))
            .into_owned();
    }
    result
}

fn render_template(inner: &str) -> String {
    let parts = split_top_level(inner, b'|');
    let name = parts[0].trim().to_lowercase().replace('_', " ");
    let positional: Vec<&str> = parts[1..]
        .iter()
        .filter(|arg| named_arg(arg).is_none())
        .map(|arg| arg.trim())
        .collect();

    if LIST_TEMPLATES.contains(&name.as_str()) {
        let items: Vec<&str> = positional
            .iter()
            .flat_map(|arg| arg.lines())
            .map(|line| line.trim().trim_start_matches(&['*', '#'][..]).trim())
            .filter(|item| !item.is_empty())
            .collect();
        return items.join(", ");
    }

    if WRAPPER_TEMPLATES.contains(&name.as_str()) || name.starts_with("lang-") {
        return positional.last().map(|s| s.to_string()).unwrap_or_default();
    }

    if CIRCA_TEMPLATES.contains(&name.as_str()) {
        return match positional.first() {
            Some(year) if !year.is_empty() => format!("c. {year}"),
            _ => String::new(),
        };
    }

    String::new()
}

// ---------------------------------------------------------------------------
// Pass 5: HTML tags
// ---------------------------------------------------------------------------

/// Strip HTML tags, preserving inner text. Line breaks become list separators.
fn strip_html_tags(text: &str) -> String {
    static BR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^<>]*>").expect("valid regex"));

    let result = BR_RE.replace_all(text, ", ");
    TAG_RE.replace_all(&result, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 6: Internal links
// ---------------------------------------------------------------------------

/// `[[Target|Label]]` → `Label`, `[[Target]]` → `Target`, file/category links dropped.
fn unwrap_wiki_links(text: &str) -> String {
    static MEDIA_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)\[\[\s*(?:file|image|category|media):[^\[\]]*\]\]").expect("valid regex")
    });
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[\[([^\[\]]*)\]\]").expect("valid regex"));

    let mut result = text.to_string();
    while MEDIA_RE.is_match(&result) || LINK_RE.is_match(&result) {
        let stripped = MEDIA_RE.replace_all(&result, "");
        result = LINK_RE
            .replace_all(&stripped, |caps: &Captures| link_label(&caps[1]).to_string())
            .into_owned();
    }
    result
}

fn link_label(inner: &str) -> &str {
    let label = inner.rsplit('|').next().unwrap_or(inner);
    // `[[Target#Section]]` shows only the target.
    let label = if inner.contains('|') {
        label
    } else {
        label.split('#').next().unwrap_or(label)
    };
    label.trim()
}

// ---------------------------------------------------------------------------
// Pass 7: External links
// ---------------------------------------------------------------------------

/// `[https://example.org Label]` → `Label`, bare `[https://example.org]` dropped.
fn unwrap_external_links(text: &str) -> String {
    static LABELED_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\[(?:https?:)?//[^\s\[\]]+\s+([^\[\]]*)\]").expect("valid regex")
    });
    static BARE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[(?:https?:)?//[^\s\[\]]*\]").expect("valid regex"));

    let result = LABELED_RE.replace_all(text, "$1");
    BARE_RE.replace_all(&result, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 8: Citation markers
// ---------------------------------------------------------------------------

/// Remove `[1]`, `[a]`, `[citation needed]` and other bracketed cross-references.
fn strip_bracket_notes(text: &str) -> String {
    static NOTE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[[^\[\]]*\]").expect("valid regex"));

    NOTE_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 9: Bold/italic quotes
// ---------------------------------------------------------------------------

fn strip_emphasis(text: &str) -> String {
    static QUOTES_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"'{2,}").expect("valid regex"));

    QUOTES_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 10: Lifespan parentheticals
// ---------------------------------------------------------------------------

/// Drop `(born …)` / `(died …)` asides and parentheses left empty by earlier passes.
fn strip_life_parentheticals(text: &str) -> String {
    static LIFE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)\s*\((?:born|died|b\.|d\.)\s[^()]*\)").expect("valid regex")
    });
    static EMPTY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s*\(\s*(?:[,;:]\s*)*\)").expect("valid regex"));

    let result = LIFE_RE.replace_all(text, "");
    EMPTY_RE.replace_all(&result, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 11: Whitespace
// ---------------------------------------------------------------------------

/// Collapse whitespace runs, drop spaces before punctuation, trim both ends.
fn normalize_whitespace(text: &str) -> String {
    static SPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
    static PUNCT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r" ([,;:.!?)])").expect("valid regex"));
    static OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\( ").expect("valid regex"));
    static DOUBLE_COMMA_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r",(?: ?,)+").expect("valid regex"));

    let result = SPACE_RE.replace_all(text, " ");
    let result = PUNCT_RE.replace_all(&result, "$1");
    let result = OPEN_RE.replace_all(&result, "(");
    let result = DOUBLE_COMMA_RE.replace_all(&result, ",");

    result
        .trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
