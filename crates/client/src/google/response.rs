//! Google Custom Search response types.

use serde::Deserialize;

use crate::ProviderItem;

/// Raw response from the Custom Search JSON API.
///
/// Only `items` is used; a response without it has no results.
#[derive(Debug, Deserialize)]
pub struct GoogleApiResponse {
    #[serde(default)]
    pub items: Option<Vec<ProviderItem>>,
}

impl GoogleApiResponse {
    pub fn into_items(self) -> Vec<ProviderItem> {
        self.items.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"{
        "kind": "customsearch#search",
        "searchInformation": { "totalResults": "2" },
        "items": [
            {
                "kind": "customsearch#result",
                "title": "Go Lang",
                "link": "https://go.dev",
                "snippet": "The Go programming language",
                "displayLink": "go.dev"
            },
            {
                "title": "Tour of Go",
                "link": "https://go.dev/tour"
            }
        ]
    }"#;

    #[test]
    fn test_deserialize_items() {
        let response: GoogleApiResponse = serde_json::from_str(FIXTURE_JSON).unwrap();
        let items = response.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Go Lang"));
        assert_eq!(items[0].link.as_deref(), Some("https://go.dev"));
        assert_eq!(items[0].snippet.as_deref(), Some("The Go programming language"));
        assert!(items[1].snippet.is_none());
    }

    #[test]
    fn test_missing_items() {
        let json = r#"{"kind": "customsearch#search", "searchInformation": {"totalResults": "0"}}"#;
        let response: GoogleApiResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_items().is_empty());
    }
}
