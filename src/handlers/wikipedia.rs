use super::Encyclopedia;
use crate::config::ServicesConfig;
use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    extract: Option<String>,
}

/// The first `count` sentences of `text`
pub fn first_sentences(text: &str, count: usize) -> String {
    let mut found = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                found += 1;
                if found == count {
                    return text[..i + c.len_utf8()].trim().to_string();
                }
            }
        }
    }
    text.trim().to_string()
}

/// MediaWiki search + intro extract
pub struct WikipediaClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl WikipediaClient {
    pub fn new(client: reqwest::blocking::Client, services: &ServicesConfig) -> Self {
        Self {
            client,
            url: services.wikipedia_api_url.clone(),
        }
    }

    fn best_extract(body: QueryResponse) -> Option<String> {
        // Lowest search index is the best match
        body.query?
            .pages
            .into_values()
            .filter(|p| p.extract.as_deref().is_some_and(|e| !e.trim().is_empty()))
            .min_by_key(|p| p.index.unwrap_or(u32::MAX))
            .and_then(|p| p.extract)
    }
}

impl Encyclopedia for WikipediaClient {
    fn summary(&mut self, topic: &str, sentences: usize) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrsearch", topic),
                ("gsrlimit", "1"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
            ])
            .send()?
            .error_for_status()?;
        let body: QueryResponse = response.json()?;

        let summary = Self::best_extract(body).map(|extract| first_sentences(&extract, sentences));
        debug!("Wikipedia lookup for {:?}: found={}", topic, summary.is_some());
        Ok(summary)
    }
}
