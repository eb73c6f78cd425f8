//! Keyword classification into domain tags, and period tags from dates.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use chronicle_shared::{StructuredDate, Tag};

/// Keywords per domain tag. Matched case-insensitively as whole words,
/// with an optional plural `s`.
static KEYWORDS: &[(Tag, &[&str])] = &[
    (
        Tag::Politician,
        &[
            "politician",
            "president",
            "prime minister",
            "minister",
            "statesman",
            "stateswoman",
            "senator",
            "governor",
            "mayor",
            "chancellor",
            "diplomat",
        ],
    ),
    (
        Tag::Scientist,
        &[
            "scientist",
            "physicist",
            "chemist",
            "biologist",
            "mathematician",
            "astronomer",
            "naturalist",
            "researcher",
            "discovered",
        ],
    ),
    (
        Tag::Artist,
        &[
            "artist",
            "painter",
            "sculptor",
            "musician",
            "composer",
            "architect",
        ],
    ),
    (
        Tag::Writer,
        &[
            "writer",
            "poet",
            "novelist",
            "playwright",
            "dramatist",
            "essayist",
            "author",
        ],
    ),
    (
        Tag::Explorer,
        &["explorer", "navigator", "adventurer", "discoverer", "circumnavigator"],
    ),
    (
        Tag::Military,
        &[
            "admiral",
            "soldier",
            "commander",
            "military",
            "field marshal",
            "army officer",
            "conqueror",
            "warlord",
        ],
    ),
    (Tag::Philosopher, &["philosopher", "thinker", "philosophy"]),
    (Tag::Inventor, &["inventor", "invention", "patent", "engineer"]),
    (
        Tag::Religious,
        &[
            "priest",
            "bishop",
            "pope",
            "monk",
            "nun",
            "religious",
            "saint",
            "theologian",
            "prophet",
        ],
    ),
    (
        Tag::Royalty,
        &[
            "king",
            "queen",
            "emperor",
            "empress",
            "prince",
            "princess",
            "royal",
            "monarch",
            "pharaoh",
            "sultan",
        ],
    ),
];

/// One compiled whole-word alternation per tag, in table order.
static MATCHERS: LazyLock<Vec<(Tag, Regex)>> = LazyLock::new(|| {
    KEYWORDS
        .iter()
        .map(|(tag, words)| {
            let alternation = words
                .iter()
                .map(|word| {
                    word.split_whitespace()
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(r"\s+")
                })
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"(?i)\b(?:{alternation})s?\b");
            (*tag, Regex::new(&pattern).expect("keyword regex"))
        })
        .collect()
});

/// Domain tags whose keywords occur in `text`. No match yields an empty set.
pub fn classify(text: &str) -> BTreeSet<Tag> {
    MATCHERS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(tag, _)| *tag)
        .collect()
}

/// Historical period from the death date, falling back to the birth date.
pub fn period_for(
    birth: Option<&StructuredDate>,
    death: Option<&StructuredDate>,
) -> Option<Tag> {
    let year = death.or(birth)?.astronomical_year();
    let tag = match year {
        ..500 => Tag::Ancient,
        500..1000 => Tag::EarlyMiddleAges,
        1000..1300 => Tag::HighMiddleAges,
        1300..1500 => Tag::LateMiddleAges,
        1500..1800 => Tag::EarlyModern,
        1800..1900 => Tag::Modern,
        _ => Tag::Contemporary,
    };
    Some(tag)
}

#[cfg(test)]
mod tests {
    use chronicle_shared::{DatePrecision, Era};

    use super::*;

    fn year(year: u32, era: Era) -> StructuredDate {
        StructuredDate {
            year,
            month: None,
            day: None,
            era,
            precision: DatePrecision::YearOnly,
        }
    }

    #[test]
    fn physicist_is_scientist() {
        let tags = classify("German-born theoretical physicist");
        assert_eq!(tags, BTreeSet::from([Tag::Scientist]));
    }

    #[test]
    fn multiple_tags_in_taxonomy_order() {
        let tags = classify("Roman general, statesman and author of Latin prose; philosopher");
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec![Tag::Politician, Tag::Writer, Tag::Philosopher]
        );
    }

    #[test]
    fn whole_words_and_plurals() {
        assert!(classify("one of the great painters").contains(&Tag::Artist));
        assert!(classify("Prime  Minister of the UK").contains(&Tag::Politician));
        // `king` must not fire inside other words.
        assert!(!classify("a making of things, walking").contains(&Tag::Royalty));
        assert!(!classify("Kingdom of Württemberg").contains(&Tag::Royalty));
    }

    #[test]
    fn no_keywords_is_empty() {
        assert!(classify("").is_empty());
        assert!(classify("lived in a small town").is_empty());
    }

    #[test]
    fn period_prefers_death_date() {
        let birth = year(1879, Era::Ce);
        let death = year(1955, Era::Ce);
        assert_eq!(period_for(Some(&birth), Some(&death)), Some(Tag::Contemporary));
        assert_eq!(period_for(Some(&birth), None), Some(Tag::Modern));
        assert_eq!(period_for(None, None), None);
    }

    #[test]
    fn period_boundaries() {
        assert_eq!(period_for(None, Some(&year(399, Era::Bce))), Some(Tag::Ancient));
        assert_eq!(period_for(None, Some(&year(499, Era::Ce))), Some(Tag::Ancient));
        assert_eq!(period_for(None, Some(&year(500, Era::Ce))), Some(Tag::EarlyMiddleAges));
        assert_eq!(period_for(None, Some(&year(1066, Era::Ce))), Some(Tag::HighMiddleAges));
        assert_eq!(period_for(None, Some(&year(1492, Era::Ce))), Some(Tag::LateMiddleAges));
        assert_eq!(period_for(None, Some(&year(1519, Era::Ce))), Some(Tag::EarlyModern));
        assert_eq!(period_for(None, Some(&year(1821, Era::Ce))), Some(Tag::Modern));
        assert_eq!(period_for(None, Some(&year(1900, Era::Ce))), Some(Tag::Contemporary));
    }
}
