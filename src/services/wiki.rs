//! Wikipedia lookups through the MediaWiki action API.

use async_trait::async_trait;
use serde::Deserialize;

const SEARCH_LIMIT: &str = "10";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiHit {
    pub page_id: u64,
    pub title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("Page not found")]
    PageNotFound,
    #[error("unexpected response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait WikiService: Send + Sync {
    /// Fetches a page and converts it to markdown. Numeric ids select by page
    /// id, anything else by title.
    async fn convert_page(&self, id: &str) -> Result<String, WikiError>;

    async fn search(&self, query: &str) -> Result<Vec<WikiHit>, WikiError>;
}

pub struct MediaWiki {
    client: reqwest::Client,
    api_url: String,
}

impl MediaWiki {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<serde_json::Value, WikiError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl WikiService for MediaWiki {
    async fn convert_page(&self, id: &str) -> Result<String, WikiError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(WikiError::PageNotFound);
        }
        let selector = if id.chars().all(|c| c.is_ascii_digit()) {
            "pageids"
        } else {
            "titles"
        };
        let body = self
            .query(&[
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("exsectionformat", "wiki"),
                ("redirects", "1"),
                (selector, id),
            ])
            .await?;
        let page = parse_extract_response(body)?;
        Ok(extract_to_markdown(&page.title, &page.extract))
    }

    async fn search(&self, query: &str) -> Result<Vec<WikiHit>, WikiError> {
        let body = self
            .query(&[
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", SEARCH_LIMIT),
            ])
            .await?;
        parse_search_response(body)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    pageid: u64,
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
}

struct PageText {
    title: String,
    extract: String,
}

fn parse_search_response(body: serde_json::Value) -> Result<Vec<WikiHit>, WikiError> {
    let response: SearchResponse =
        serde_json::from_value(body).map_err(|e| WikiError::Malformed(e.to_string()))?;
    Ok(response
        .query
        .search
        .into_iter()
        .map(|entry| WikiHit {
            page_id: entry.pageid,
            title: entry.title,
        })
        .collect())
}

fn parse_extract_response(body: serde_json::Value) -> Result<PageText, WikiError> {
    let response: ExtractResponse =
        serde_json::from_value(body).map_err(|e| WikiError::Malformed(e.to_string()))?;
    let page = response
        .query
        .pages
        .into_iter()
        .next()
        .ok_or(WikiError::PageNotFound)?;
    if page.missing || page.invalid {
        return Err(WikiError::PageNotFound);
    }
    match page.extract {
        Some(extract) if !extract.trim().is_empty() => Ok(PageText {
            title: page.title,
            extract,
        }),
        _ => Err(WikiError::PageNotFound),
    }
}

/// Turns a plain-text extract into markdown: `== Heading ==` lines become ATX
/// headings, blank lines are dropped and the remaining lines are separated by
/// one empty line.
fn extract_to_markdown(title: &str, extract: &str) -> String {
    let mut blocks = Vec::new();
    if !title.is_empty() {
        blocks.push(format!("# {title}"));
    }
    for line in extract.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match section_heading(line) {
            Some((level, heading)) if !heading.is_empty() => {
                blocks.push(format!("{} {heading}", "#".repeat(level)));
            }
            Some(_) => {}
            None => blocks.push(line.to_string()),
        }
    }
    blocks.join("\n\n")
}

fn section_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '=').count();
    if level < 2 || line.len() <= level * 2 {
        return None;
    }
    let closing = line.chars().rev().take_while(|&c| c == '=').count();
    if closing != level {
        return None;
    }
    Some((level.min(6), line[level..line.len() - level].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_response_yields_hits_in_order() {
        let body = json!({
            "batchcomplete": true,
            "query": {
                "searchinfo": {"totalhits": 2},
                "search": [
                    {"ns": 0, "title": "Rust (programming language)", "pageid": 29414838},
                    {"ns": 0, "title": "Rust", "pageid": 26477}
                ]
            }
        });
        let hits = parse_search_response(body).expect("parse");
        assert_eq!(
            hits,
            vec![
                WikiHit {
                    page_id: 29414838,
                    title: "Rust (programming language)".into()
                },
                WikiHit {
                    page_id: 26477,
                    title: "Rust".into()
                },
            ]
        );
    }

    #[test]
    fn search_without_results_is_empty() {
        let body = json!({"query": {"search": []}});
        assert!(parse_search_response(body).expect("parse").is_empty());
    }

    #[test]
    fn missing_page_is_not_found() {
        let body = json!({"query": {"pages": [{"pageid": 0, "missing": true}]}});
        assert!(matches!(
            parse_extract_response(body),
            Err(WikiError::PageNotFound)
        ));
    }

    #[test]
    fn extract_is_converted_to_markdown() {
        let body = json!({
            "query": {"pages": [{
                "pageid": 1,
                "title": "Elon",
                "extract": "Elon is a name.\n\n\n== Usage ==\n  Common in Hebrew.  \n=== Given name ===\nSee also."
            }]}
        });
        let page = parse_extract_response(body).expect("parse");
        assert_eq!(
            extract_to_markdown(&page.title, &page.extract),
            "# Elon\n\nElon is a name.\n\n## Usage\n\nCommon in Hebrew.\n\n### Given name\n\nSee also."
        );
    }

    #[test]
    fn heading_detection_requires_balanced_markers() {
        assert_eq!(section_heading("== History =="), Some((2, "History")));
        assert_eq!(section_heading("== unbalanced ==="), None);
        assert_eq!(section_heading("a == b"), None);
        assert_eq!(section_heading("===="), None);
    }
}
