//! Infobox label aliases.
//!
//! Labels are normalized (trimmed, lower-cased, spaces and hyphens turned into
//! underscores) before lookup. Anything not listed here is ignored.

pub const NAME: &str = "name";
pub const BIRTH_DATE: &str = "birth_date";
pub const DEATH_DATE: &str = "death_date";
pub const BIRTH_PLACE: &str = "birth_place";
pub const DEATH_PLACE: &str = "death_place";
pub const OCCUPATION: &str = "occupation";
pub const NATIONALITY: &str = "nationality";

/// Canonical field names, in record order.
pub const CANONICAL_FIELDS: [&str; 7] = [
    NAME,
    BIRTH_DATE,
    DEATH_DATE,
    BIRTH_PLACE,
    DEATH_PLACE,
    OCCUPATION,
    NATIONALITY,
];

/// `(normalized label, canonical field)` pairs.
static ALIASES: &[(&str, &str)] = &[
    // name
    ("name", NAME),
    ("full_name", NAME),
    ("birth_name", NAME),
    ("honorific_name", NAME),
    // birth_date
    ("birth_date", BIRTH_DATE),
    ("born", BIRTH_DATE),
    ("date_of_birth", BIRTH_DATE),
    ("birthdate", BIRTH_DATE),
    ("dob", BIRTH_DATE),
    ("birth_year", BIRTH_DATE),
    // death_date
    ("death_date", DEATH_DATE),
    ("died", DEATH_DATE),
    ("date_of_death", DEATH_DATE),
    ("deathdate", DEATH_DATE),
    ("dod", DEATH_DATE),
    ("death_year", DEATH_DATE),
    // birth_place
    ("birth_place", BIRTH_PLACE),
    ("place_of_birth", BIRTH_PLACE),
    ("birthplace", BIRTH_PLACE),
    ("pob", BIRTH_PLACE),
    // death_place
    ("death_place", DEATH_PLACE),
    ("place_of_death", DEATH_PLACE),
    ("deathplace", DEATH_PLACE),
    ("pod", DEATH_PLACE),
    // occupation
    ("occupation", OCCUPATION),
    ("occupations", OCCUPATION),
    ("profession", OCCUPATION),
    // nationality
    ("nationality", NATIONALITY),
    ("citizenship", NATIONALITY),
    ("country", NATIONALITY),
];

/// Normalize a raw infobox label for alias lookup.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Map a raw label to its canonical field name.
pub fn canonical_field(label: &str) -> Option<&'static str> {
    let normalized = normalize_label(label);
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| *canonical)
}
