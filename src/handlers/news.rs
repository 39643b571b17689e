use super::NewsSource;
use crate::config::ServicesConfig;
use crate::{JarvisError, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    status: String,
    #[serde(rename = "totalResults", default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
}

/// Drop the outlet suffix from a headline
pub fn clean_headline(title: &str) -> String {
    let head = title.split(" - ").next().unwrap_or(title);
    head.replace(" | Reuters", "").trim().to_string()
}

/// Spoken form of the headlines list
pub fn headlines_sentence(headlines: &[String]) -> String {
    let mut text = String::from("Today's top headlines are: ");
    for (i, headline) in headlines.iter().enumerate() {
        text.push_str(&format!("Number {}. {}. ", i + 1, clean_headline(headline)));
    }
    text.trim_end().to_string()
}

/// NewsAPI top-headlines client
pub struct NewsApiClient {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    url: String,
    country: String,
}

impl NewsApiClient {
    pub fn new(client: reqwest::blocking::Client, services: &ServicesConfig) -> Self {
        Self {
            client,
            api_key: services.news_api_key.clone(),
            url: services.news_api_url.clone(),
            country: services.news_country.clone(),
        }
    }
}

impl NewsSource for NewsApiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn top_headlines(&mut self, limit: usize) -> Result<Vec<String>> {
        let Some(ref key) = self.api_key else {
            return Err(JarvisError::ConfigError("News API key is not configured".into()));
        };

        let response = self
            .client
            .get(&self.url)
            .query(&[("country", self.country.as_str())])
            .header("X-Api-Key", key.as_str())
            .send()?
            .error_for_status()?;
        let body: HeadlinesResponse = response.json()?;

        if body.status != "ok" {
            return Err(JarvisError::HandlerError(
                body.message.unwrap_or_else(|| format!("status {}", body.status)),
            ));
        }
        debug!("News API returned {} results", body.total_results);

        Ok(body
            .articles
            .into_iter()
            .filter_map(|a| a.title)
            .filter(|t| !t.trim().is_empty())
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_headline() {
        assert_eq!(
            clean_headline("Markets rally on rate hopes - Financial Times"),
            "Markets rally on rate hopes"
        );
        assert_eq!(clean_headline("Storm hits coast | Reuters"), "Storm hits coast");
        assert_eq!(clean_headline("Plain title"), "Plain title");
    }

    #[test]
    fn test_headlines_sentence() {
        let text = headlines_sentence(&["A - X".to_string(), "B | Reuters".to_string()]);
        assert_eq!(text, "Today's top headlines are: Number 1. A. Number 2. B.");
    }

    #[test]
    fn test_response_parsing() {
        let body: HeadlinesResponse = serde_json::from_str(
            r#"{"status":"ok","totalResults":2,"articles":[{"title":"One"},{"title":null}]}"#,
        )
        .unwrap();
        assert_eq!(body.total_results, 2);
        assert_eq!(body.articles.len(), 2);
        assert!(body.articles[1].title.is_none());
    }

    #[test]
    fn test_unconfigured_client() {
        let services = ServicesConfig::default();
        let mut client = NewsApiClient::new(reqwest::blocking::Client::new(), &services);
        assert!(!client.is_configured());
        assert!(client.top_headlines(3).is_err());
    }
}
