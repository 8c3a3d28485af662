//! arXiv Client
//!
//! Talks to the public arXiv export API:
//! - Listing: Atom feed query sorted by submission date (newest first)
//! - Lookup: metadata for an explicit `id_list`
//! - Full text: downloads the PDF and extracts plain text with lopdf
//!
//! The feed is parsed with quick-xml's event reader; only the handful of
//! entry fields the research stage needs are kept.

use crate::types::{AppError, AppResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ARXIV_API_BASE: &str = "http://export.arxiv.org/api/query";

/// Upper bound on extracted full text handed back to the model
pub const MAX_FULL_TEXT_CHARS: usize = 12_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

static ARXIV_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}\.\d{4,5}|[a-z][a-z\-]*(\.[A-Z]{2})?/\d{7})(v\d+)?$")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

/// One paper entry from the arXiv feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArxivPaper {
    /// Versioned identifier, e.g. `2401.01234v1`
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    /// RFC 3339 submission timestamp as reported by the feed
    pub published: String,
    pub abs_url: String,
    pub pdf_url: Option<String>,
}

pub struct ArxivClient {
    client: Client,
    api_base: String,
}

impl ArxivClient {
    pub fn new(api_base: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.to_string(),
        })
    }

    /// Newest papers matching `query`, most recent submission first
    pub async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<ArxivPaper>> {
        let search_query = build_search_query(query);
        info!(query = %search_query, max_results, "Searching arXiv");

        let max_results = max_results.to_string();
        let params = [
            ("search_query", search_query.as_str()),
            ("start", "0"),
            ("max_results", max_results.as_str()),
            ("sortBy", "submittedDate"),
            ("sortOrder", "descending"),
        ];

        let papers = parse_feed(&self.get_feed(&params).await?)?;
        debug!(count = papers.len(), "arXiv search returned");
        Ok(papers)
    }

    /// Metadata for explicit identifiers, in feed order
    pub async fn fetch_by_ids(&self, ids: &[String]) -> AppResult<Vec<ArxivPaper>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids.join(",");
        let max_results = ids.len().to_string();
        let params = [("id_list", id_list.as_str()), ("max_results", max_results.as_str())];

        parse_feed(&self.get_feed(&params).await?)
    }

    /// Download the paper PDF and extract the text of its first `max_pages` pages
    pub async fn read_full_text(&self, paper: &ArxivPaper, max_pages: usize) -> AppResult<String> {
        let pdf_url = paper
            .pdf_url
            .clone()
            .ok_or_else(|| AppError::Search(format!("No PDF link for {}", paper.id)))?;

        info!(id = %paper.id, url = %pdf_url, "Downloading paper PDF");

        let response = self
            .client
            .get(&pdf_url)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("PDF download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "PDF download failed ({}) for {}",
                response.status(),
                paper.id
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Search(format!("PDF download failed: {}", e)))?;

        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes, max_pages))
            .await
            .map_err(|e| AppError::Internal(format!("PDF extraction task failed: {}", e)))??;

        Ok(truncate_chars(&text, MAX_FULL_TEXT_CHARS))
    }

    async fn get_feed(&self, params: &[(&str, &str)]) -> AppResult<String> {
        let response = self
            .client
            .get(&self.api_base)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("arXiv request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!("arXiv API error ({}): {}", status, body)));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("Failed to read arXiv response: {}", e)))
    }
}

/// Turn free text into an arXiv `search_query`. Queries that already use
/// field prefixes (`cat:cs.AI`, `ti:...`) pass through untouched.
pub fn build_search_query(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return "cat:cs.AI".to_string();
    }
    if query.contains(':') {
        return query.to_string();
    }

    query
        .split_whitespace()
        .map(|term| format!("all:{}", term))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Strip URL, `arXiv:` and `.pdf` decorations from an identifier
pub fn normalize_id(raw: &str) -> String {
    let mut id = raw.trim();
    for prefix in ["https://", "http://"] {
        id = id.strip_prefix(prefix).unwrap_or(id);
    }
    for prefix in ["export.arxiv.org/", "arxiv.org/"] {
        id = id.strip_prefix(prefix).unwrap_or(id);
    }
    for prefix in ["abs/", "pdf/", "arXiv:", "arxiv:"] {
        id = id.strip_prefix(prefix).unwrap_or(id);
    }
    id.strip_suffix(".pdf").unwrap_or(id).to_string()
}

pub fn is_valid_id(id: &str) -> bool {
    ARXIV_ID_RE.is_match(id)
}

#[derive(Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    abs_url: Option<String>,
    pdf_url: Option<String>,
}

impl EntryBuilder {
    fn build(self) -> ArxivPaper {
        let id = normalize_id(&self.id);
        let abs_url = self
            .abs_url
            .unwrap_or_else(|| format!("http://arxiv.org/abs/{}", id));

        ArxivPaper {
            id,
            title: collapse_whitespace(&self.title),
            summary: collapse_whitespace(&self.summary),
            authors: self.authors,
            published: self.published.trim().to_string(),
            abs_url,
            pdf_url: self.pdf_url,
        }
    }
}

#[derive(Clone, Copy)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// Parse an arXiv Atom feed into papers
pub fn parse_feed(xml: &str) -> AppResult<Vec<ArxivPaper>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;
    let mut in_author = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"entry" {
                    entry = Some(EntryBuilder::default());
                    continue;
                }
                if entry.is_none() {
                    continue;
                }
                field = match e.local_name().as_ref() {
                    b"id" => Some(Field::Id),
                    b"title" => Some(Field::Title),
                    b"summary" => Some(Field::Summary),
                    b"published" => Some(Field::Published),
                    b"name" if in_author => Some(Field::AuthorName),
                    b"author" => {
                        in_author = true;
                        None
                    }
                    b"link" => {
                        if let Some(builder) = entry.as_mut() {
                            apply_link(builder, &e)?;
                        }
                        None
                    }
                    _ => None,
                };
            }
            Ok(Event::Empty(e)) => {
                if let Some(builder) = entry.as_mut() {
                    if e.local_name().as_ref() == b"link" {
                        apply_link(builder, &e)?;
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(builder), Some(current)) = (entry.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| AppError::Search(format!("Malformed arXiv feed: {}", e)))?;
                    match current {
                        Field::Id => builder.id.push_str(&text),
                        Field::Title => builder.title.push_str(&text),
                        Field::Summary => builder.summary.push_str(&text),
                        Field::Published => builder.published.push_str(&text),
                        Field::AuthorName => builder.authors.push(text.trim().to_string()),
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(builder) = entry.take() {
                        // The API reports query errors as a pseudo-entry
                        if builder.id.contains("/api/errors") {
                            return Err(AppError::Search(format!(
                                "arXiv rejected the query: {}",
                                collapse_whitespace(&builder.summary)
                            )));
                        }
                        papers.push(builder.build());
                    }
                    field = None;
                }
                b"author" => in_author = false,
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Search(format!(
                    "Malformed arXiv feed at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(papers)
}

fn apply_link(builder: &mut EntryBuilder, e: &BytesStart<'_>) -> AppResult<()> {
    let mut href = None;
    let mut title = None;
    let mut rel = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| AppError::Search(format!("Malformed arXiv link: {}", e)))?;
        let value = attr
            .unescape_value()
            .map_err(|e| AppError::Search(format!("Malformed arXiv link: {}", e)))?
            .into_owned();
        match attr.key.as_ref() {
            b"href" => href = Some(value),
            b"title" => title = Some(value),
            b"rel" => rel = Some(value),
            _ => {}
        }
    }

    let Some(href) = href else {
        return Ok(());
    };

    if title.as_deref() == Some("pdf") || href.contains("/pdf/") {
        builder.pdf_url = Some(href);
    } else if rel.as_deref() == Some("alternate") {
        builder.abs_url = Some(href);
    }

    Ok(())
}

fn extract_pdf_text(bytes: &[u8], max_pages: usize) -> AppResult<String> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| AppError::Search(format!("Could not parse PDF: {}", e)))?;

    let pages: Vec<u32> = document
        .get_pages()
        .keys()
        .copied()
        .take(max_pages.max(1))
        .collect();

    let text = document
        .extract_text(&pages)
        .map_err(|e| AppError::Search(format!("Could not extract PDF text: {}", e)))?;

    if text.trim().is_empty() {
        warn!("PDF contained no extractable text");
        return Err(AppError::Search("PDF contained no extractable text".to_string()));
    }

    Ok(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
