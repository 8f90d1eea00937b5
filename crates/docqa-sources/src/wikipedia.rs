//! Wikipedia article source backed by the MediaWiki action API.
//!
//! A topic is first resolved through full-text search (so "rust lang" finds
//! "Rust (programming language)"), then the plain-text extract of the best
//! hit is fetched. Disambiguation pages are reported with the other search
//! hits as candidates.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use docqa_core::config::WikiConfig;
use docqa_core::traits::ArticleSource;
use docqa_core::types::Article;
use docqa_core::{Error, Result};

const SEARCH_LIMIT: &str = "6";

pub struct WikipediaSource {
    http: reqwest::Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    query: Option<PageQuery>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<serde_json::Map<String, serde_json::Value>>,
}

/// What a page lookup resolved to.
#[derive(Debug, PartialEq, Eq)]
pub enum PageLookup {
    Article(Article),
    Disambiguation(String),
    Missing,
}

pub fn parse_search(body: &str) -> Result<Vec<String>> {
    let parsed: SearchResponse = serde_json::from_str(body).map_err(|e| Error::retrieval(format!("malformed search response: {e}")))?;
    Ok(parsed.query.map(|q| q.search.into_iter().map(|h| h.title).collect()).unwrap_or_default())
}

pub fn parse_page(body: &str) -> Result<PageLookup> {
    let parsed: PageResponse = serde_json::from_str(body).map_err(|e| Error::retrieval(format!("malformed page response: {e}")))?;
    let Some(page) = parsed.query.and_then(|q| q.pages.into_iter().next()) else { return Ok(PageLookup::Missing) };
    if page.missing { return Ok(PageLookup::Missing); }
    if page.pageprops.as_ref().is_some_and(|p| p.contains_key("disambiguation")) {
        return Ok(PageLookup::Disambiguation(page.title));
    }
    match page.extract {
        Some(text) if !text.trim().is_empty() => Ok(PageLookup::Article(Article { title: page.title, text })),
        _ => Ok(PageLookup::Missing),
    }
}

impl WikipediaSource {
    pub fn new(cfg: &WikiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| Error::InvalidConfig(format!("wikipedia client: {e}")))?;
        Ok(Self { http, api_url: cfg.base_url.clone() })
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<String> {
        let resp = self
            .http
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::retrieval(format!("wikipedia unreachable: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::retrieval(format!("wikipedia returned {status}")));
        }
        resp.text().await.map_err(|e| Error::retrieval(format!("wikipedia body: {e}")))
    }

    async fn search(&self, topic: &str) -> Result<Vec<String>> {
        let body = self
            .get(&[("action", "query"), ("list", "search"), ("srsearch", topic), ("srlimit", SEARCH_LIMIT), ("format", "json")])
            .await?;
        parse_search(&body)
    }

    async fn page(&self, title: &str) -> Result<PageLookup> {
        let body = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("ppprop", "disambiguation"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;
        parse_page(&body)
    }
}

#[async_trait]
impl ArticleSource for WikipediaSource {
    async fn fetch_article(&self, topic: &str) -> Result<Article> {
        let topic = topic.trim();
        if topic.is_empty() { return Err(Error::InvalidRequest("topic must not be empty".into())); }

        let titles = self.search(topic).await?;
        debug!(topic, hits = titles.len(), "wikipedia search");
        let Some(best) = titles.first() else {
            return Err(Error::NotFound(format!("no Wikipedia page found for '{topic}'")));
        };

        match self.page(best).await? {
            PageLookup::Article(article) => {
                info!(topic, title = %article.title, chars = article.text.len(), "wikipedia article fetched");
                Ok(article)
            }
            PageLookup::Disambiguation(title) => Err(Error::AmbiguousTopic {
                topic: topic.to_string(),
                options: titles.iter().filter(|t| **t != title).take(5).cloned().collect(),
            }),
            PageLookup::Missing => Err(Error::NotFound(format!("Wikipedia page '{best}' has no content"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_titles_in_rank_order() {
        let body = r#"{"batchcomplete":"","query":{"searchinfo":{"totalhits":2},"search":[{"ns":0,"title":"Rust (programming language)"},{"ns":0,"title":"Rust"}]}}"#;
        assert_eq!(parse_search(body).expect("parse"), vec!["Rust (programming language)".to_string(), "Rust".to_string()]);
        assert!(parse_search(r#"{"query":{"search":[]}}"#).expect("empty").is_empty());
    }

    #[test]
    fn page_variants() {
        let article = r#"{"query":{"pages":[{"pageid":1,"title":"Rust","extract":"Rust is an iron oxide."}]}}"#;
        assert_eq!(
            parse_page(article).expect("article"),
            PageLookup::Article(Article { title: "Rust".into(), text: "Rust is an iron oxide.".into() })
        );

        let disamb = r#"{"query":{"pages":[{"pageid":2,"title":"Mercury","extract":"Mercury may refer to:","pageprops":{"disambiguation":""}}]}}"#;
        assert_eq!(parse_page(disamb).expect("disamb"), PageLookup::Disambiguation("Mercury".into()));

        let missing = r#"{"query":{"pages":[{"ns":0,"title":"Nope","missing":true}]}}"#;
        assert_eq!(parse_page(missing).expect("missing"), PageLookup::Missing);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_page("<html>").is_err());
    }
}
