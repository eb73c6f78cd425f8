//! Wire shapes of the encyclopedia API responses.
//!
//! Only the fields the client reads are modelled; serde ignores the rest.

use serde::Deserialize;
use serde::de::IgnoredAny;

use chronicle_shared::{Coordinates, PageBody};

// ---------------------------------------------------------------------------
// action=opensearch
// ---------------------------------------------------------------------------

/// `[query, [titles], [descriptions], [urls]]`
#[derive(Debug, Deserialize)]
pub(crate) struct OpenSearchResponse(
    IgnoredAny,
    pub Vec<String>,
    IgnoredAny,
    pub Vec<String>,
);

impl OpenSearchResponse {
    /// `(title, url)` pairs in API rank order.
    pub fn candidates(self) -> Vec<(String, Option<String>)> {
        let mut urls = self.3.into_iter();
        self.1
            .into_iter()
            .map(|title| (title, urls.next()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// REST page/summary
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryResponse {
    pub title: String,
    #[serde(default)]
    pub extract: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pub content_urls: Option<ContentUrls>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentUrls {
    pub desktop: Option<PageLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageLink {
    pub page: String,
}

fn default_kind() -> String {
    "standard".into()
}

impl From<SummaryResponse> for PageBody {
    fn from(summary: SummaryResponse) -> Self {
        Self {
            title: summary.title,
            text: summary.extract,
            description: summary.description.filter(|d| !d.trim().is_empty()),
            page_url: summary
                .content_urls
                .and_then(|urls| urls.desktop)
                .map(|link| link.page),
            thumbnail_url: summary.thumbnail.map(|thumb| thumb.source),
            kind: summary.kind,
            coordinates: summary.coordinates,
        }
    }
}

// ---------------------------------------------------------------------------
// action=query&prop=revisions (formatversion=2)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RevisionsResponse {
    pub query: Option<RevisionsQuery>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevisionsQuery {
    #[serde(default)]
    pub pages: Vec<RevisionPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevisionPage {
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Revision {
    pub slots: RevisionSlots,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevisionSlots {
    pub main: RevisionSlot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevisionSlot {
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opensearch_candidates_pair_titles_with_urls() {
        let json = r#"["einstein",["Albert Einstein","Einstein family"],["",""],
            ["https://en.wikipedia.org/wiki/Albert_Einstein","https://en.wikipedia.org/wiki/Einstein_family"]]"#;
        let response: OpenSearchResponse = serde_json::from_str(json).expect("parse");
        let candidates = response.candidates();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].0, "Albert Einstein");
        assert_eq!(
            candidates[0].1.as_deref(),
            Some("https://en.wikipedia.org/wiki/Albert_Einstein")
        );
    }

    #[test]
    fn summary_maps_to_page_body() {
        let json = r#"{
            "type": "disambiguation",
            "title": "Mercury",
            "description": "",
            "extract": "Mercury may refer to:",
            "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Mercury"}}
        }"#;
        let response: SummaryResponse = serde_json::from_str(json).expect("parse");
        let body = PageBody::from(response);
        assert!(body.is_disambiguation());
        assert_eq!(body.description, None);
        assert_eq!(body.thumbnail_url, None);
        assert_eq!(body.page_url.as_deref(), Some("https://en.wikipedia.org/wiki/Mercury"));
    }

    #[test]
    fn summary_carries_coordinates() {
        let json = r#"{
            "type": "standard",
            "title": "Ulm Minster",
            "extract": "Ulm Minster is a Lutheran church.",
            "coordinates": {"lat": 48.398611, "lon": 9.9925}
        }"#;
        let response: SummaryResponse = serde_json::from_str(json).expect("parse");
        let body = PageBody::from(response);
        assert_eq!(
            body.coordinates,
            Some(Coordinates {
                lat: 48.398611,
                lon: 9.9925
            })
        );
        assert_eq!(body.kind, "standard");
    }

    #[test]
    fn summary_kind_defaults_to_standard() {
        let response: SummaryResponse =
            serde_json::from_str(r#"{"title": "X", "extract": "Y"}"#).expect("parse");
        assert_eq!(response.kind, "standard");
    }

    #[test]
    fn missing_page_flag() {
        let json = r#"{"batchcomplete":true,"query":{"pages":[{"ns":0,"title":"Nope","missing":true}]}}"#;
        let response: RevisionsResponse = serde_json::from_str(json).expect("parse");
        let pages = response.query.expect("query").pages;
        assert!(pages[0].missing);
        assert!(pages[0].revisions.is_empty());
    }
}
