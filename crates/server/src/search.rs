// DuckDuckGo Instant Answer client.
//
// The upstream payload mixes flat topics with nested category groups inside
// `RelatedTopics`; mapping is a pure function so it stays testable without a
// network.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use coauthor_common::protocol::SearchResult;

pub const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search upstream returned status {status}")]
    Upstream { status: u16 },
    #[error("search upstream returned a malformed response")]
    Malformed,
    #[error("search upstream unreachable: {0}")]
    Transport(String),
}

/// Mapped search outcome: flattened hits plus the top-level abstract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub abstract_text: String,
}

#[derive(Debug, Deserialize)]
pub struct InstantAnswerPayload {
    #[serde(rename = "Abstract", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

/// A `RelatedTopics` entry is either a topic or a named category carrying
/// its own `Topics` list. Entries with no `Text` (category headers, icons)
/// are skipped.
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(rename = "Topics", default)]
    topics: Vec<RelatedTopic>,
}

/// Flatten the instant-answer payload into at most `max_results` hits.
///
/// Nested category groups are walked in order, so truncation keeps the
/// upstream's ranking.
pub fn map_search_payload(payload: InstantAnswerPayload, max_results: usize) -> SearchOutcome {
    let mut results = Vec::new();
    collect_topics(&payload.related_topics, max_results, &mut results);
    SearchOutcome { results, abstract_text: payload.abstract_text }
}

fn collect_topics(topics: &[RelatedTopic], max_results: usize, out: &mut Vec<SearchResult>) {
    for topic in topics {
        if out.len() >= max_results {
            return;
        }
        if let Some(text) = topic.text.as_deref().filter(|t| !t.is_empty()) {
            out.push(SearchResult { text: text.to_string(), url: topic.first_url.clone() });
        } else if !topic.topics.is_empty() {
            collect_topics(&topic.topics, max_results, out);
        }
    }
}

/// Calls the instant-answer endpoint with the fixed query parameters.
pub struct SearchClient {
    http: Client,
    base: Url,
}

impl SearchClient {
    pub fn new(base: Url) -> Self {
        Self { http: Client::new(), base }
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<SearchOutcome, SearchError> {
        let response = self
            .http
            .get(self.base.clone())
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Upstream { status: status.as_u16() });
        }

        let payload: InstantAnswerPayload =
            response.json().await.map_err(|_| SearchError::Malformed)?;
        let outcome = map_search_payload(payload, max_results);
        debug!(query, hits = outcome.results.len(), "search completed");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> InstantAnswerPayload {
        serde_json::from_value(json).unwrap()
    }

    // ── map_search_payload ─────────────────────────────────────────

    #[test]
    fn maps_flat_topics_with_urls() {
        let outcome = map_search_payload(
            payload(serde_json::json!({
                "Abstract": "Rust is a systems language.",
                "RelatedTopics": [
                    {"Text": "Rust (language)", "FirstURL": "https://example.com/rust"},
                    {"Text": "Rust Belt"},
                ],
            })),
            5,
        );

        assert_eq!(outcome.abstract_text, "Rust is a systems language.");
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].text, "Rust (language)");
        assert_eq!(outcome.results[0].url.as_deref(), Some("https://example.com/rust"));
        assert_eq!(outcome.results[1].url, None);
    }

    #[test]
    fn flattens_nested_category_groups_in_order() {
        let outcome = map_search_payload(
            payload(serde_json::json!({
                "RelatedTopics": [
                    {"Text": "first", "FirstURL": "https://a"},
                    {"Name": "Category", "Topics": [
                        {"Text": "second", "FirstURL": "https://b"},
                        {"Text": "third"},
                    ]},
                    {"Text": "fourth"},
                ],
            })),
            10,
        );

        let texts: Vec<&str> = outcome.results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third", "fourth"]);
    }

    #[test]
    fn truncates_to_max_results_across_groups() {
        let outcome = map_search_payload(
            payload(serde_json::json!({
                "RelatedTopics": [
                    {"Text": "one"},
                    {"Topics": [{"Text": "two"}, {"Text": "three"}]},
                    {"Text": "four"},
                ],
            })),
            2,
        );

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[1].text, "two");
    }

    #[test]
    fn skips_entries_without_text() {
        let outcome = map_search_payload(
            payload(serde_json::json!({
                "RelatedTopics": [
                    {"FirstURL": "https://no-text"},
                    {"Text": ""},
                    {"Text": "kept"},
                ],
            })),
            5,
        );

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].text, "kept");
    }

    #[test]
    fn empty_payload_maps_to_empty_outcome() {
        let outcome = map_search_payload(payload(serde_json::json!({})), 5);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.abstract_text, "");
    }
}
