//! Tools the model can call during a role invocation
//!
//! - `search_arxiv_and_return_articles`: list recent papers for a query
//! - `read_arxiv_papers`: fetch metadata and full text for explicit IDs
//!
//! Tool failures never abort the stage. They are reported back to the model
//! as text so it can correct itself (for example after passing a placeholder ID).

use crate::search::arxiv::{self, ArxivClient, ArxivPaper};
use crate::types::{AppError, AppResult, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_SEARCH_RESULTS: usize = 25;
const MAX_PAPERS_PER_READ: usize = 3;
const DEFAULT_PAGES_TO_READ: usize = 5;
const MAX_PAGES_TO_READ: usize = 10;

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn call(&self, arguments: serde_json::Value) -> AppResult<String>;
}

/// Named set of tools offered to a role
#[derive(Default, Clone)]
pub struct ToolBox {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search + read tools backed by one arXiv client
    pub fn paper_search(client: Arc<ArxivClient>, default_results: usize) -> Self {
        let mut toolbox = Self::new();
        toolbox.add(Arc::new(SearchArxivTool {
            client: client.clone(),
            default_results,
        }));
        toolbox.add(Arc::new(ReadArxivTool { client }));
        toolbox
    }

    pub fn add(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.definition().name, tool);
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Run a model-requested call. Always yields text for the tool message.
    pub async fn execute(&self, call: &ToolCall) -> String {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "Model requested an unknown tool");
            return format!("Error: unknown tool '{}'", call.name);
        };

        let arguments = match parse_arguments(&call.arguments) {
            Ok(args) => args,
            Err(e) => return format!("Error: {}", e),
        };

        info!(tool = %call.name, "Executing tool call");
        match tool.call(arguments).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool call failed");
                format!("Error: {}", e)
            }
        }
    }
}

fn parse_arguments(raw: &str) -> AppResult<serde_json::Value> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw)
        .map_err(|e| AppError::InvalidRequest(format!("tool arguments are not valid JSON: {}", e)))
}

fn decode_args<T: for<'de> Deserialize<'de>>(arguments: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| AppError::InvalidRequest(format!("invalid tool arguments: {}", e)))
}

struct SearchArxivTool {
    client: Arc<ArxivClient>,
    default_results: usize,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    num_articles: Option<usize>,
}

#[async_trait]
impl Tool for SearchArxivTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "search_arxiv_and_return_articles".to_string(),
            description: "Search arXiv and return the newest matching articles (ID, title, authors, submission date, PDF link, abstract). Supports arXiv field prefixes such as 'cat:cs.AI'.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search terms or an arXiv query such as 'cat:cs.AI'" },
                    "num_articles": { "type": "integer", "description": "Number of articles to return" }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, arguments: serde_json::Value) -> AppResult<String> {
        let args: SearchArgs = decode_args(arguments)?;
        let count = args
            .num_articles
            .unwrap_or(self.default_results)
            .clamp(1, MAX_SEARCH_RESULTS);

        let papers = self.client.search(&args.query, count).await?;
        if papers.is_empty() {
            return Ok(format!("No arXiv articles found for '{}'.", args.query));
        }

        Ok(papers.iter().map(format_listing).collect::<Vec<_>>().join("\n\n"))
    }
}

struct ReadArxivTool {
    client: Arc<ArxivClient>,
}

#[derive(Deserialize)]
struct ReadArgs {
    id_list: Vec<String>,
    #[serde(default)]
    pages_to_read: Option<usize>,
}

#[async_trait]
impl Tool for ReadArxivTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "read_arxiv_papers".to_string(),
            description: "Read the full text of arXiv papers. Pass real IDs returned by search_arxiv_and_return_articles (e.g. '2401.01234v1').".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "id_list": { "type": "array", "items": { "type": "string" }, "description": "arXiv IDs to read" },
                    "pages_to_read": { "type": "integer", "description": "Pages of each PDF to read" }
                },
                "required": ["id_list"]
            }),
        }
    }

    async fn call(&self, arguments: serde_json::Value) -> AppResult<String> {
        let args: ReadArgs = decode_args(arguments)?;
        let ids = validated_ids(&args.id_list)?;
        let pages = args
            .pages_to_read
            .unwrap_or(DEFAULT_PAGES_TO_READ)
            .clamp(1, MAX_PAGES_TO_READ);

        let papers = self.client.fetch_by_ids(&ids).await?;
        if papers.is_empty() {
            return Err(AppError::Search(format!("No papers found for IDs {:?}", ids)));
        }

        let mut sections = Vec::with_capacity(papers.len());
        for paper in &papers {
            let body = match self.client.read_full_text(paper, pages).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(id = %paper.id, error = %e, "Full text unavailable, using abstract");
                    paper.summary.clone()
                }
            };
            sections.push(format!("{}\n\nContent:\n{}", format_listing(paper), body));
        }

        Ok(sections.join("\n\n---\n\n"))
    }
}

/// Normalize requested IDs and refuse placeholders before hitting the API
fn validated_ids(requested: &[String]) -> AppResult<Vec<String>> {
    if requested.is_empty() {
        return Err(AppError::InvalidRequest(
            "id_list is empty; search first and pass IDs from the results".to_string(),
        ));
    }

    let ids: Vec<String> = requested.iter().map(|id| arxiv::normalize_id(id)).collect();
    let invalid: Vec<&String> = ids.iter().filter(|id| !arxiv::is_valid_id(id)).collect();
    if !invalid.is_empty() {
        return Err(AppError::InvalidRequest(format!(
            "{:?} are not arXiv IDs; search first and pass IDs from the results",
            invalid
        )));
    }

    Ok(ids.into_iter().take(MAX_PAPERS_PER_READ).collect())
}

fn format_listing(paper: &ArxivPaper) -> String {
    format!(
        "ID: {}\nTitle: {}\nAuthors: {}\nPublished: {}\nPDF: {}\nAbstract: {}",
        paper.id,
        paper.title,
        paper.authors.join(", "),
        paper.published,
        paper.pdf_url.as_deref().unwrap_or(&paper.abs_url),
        paper.summary
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".to_string(),
                description: "echo".to_string(),
                parameters: serde_json::json!({ "type": "object" }),
            }
        }

        async fn call(&self, arguments: serde_json::Value) -> AppResult<String> {
            match arguments.get("text").and_then(|v| v.as_str()) {
                Some(text) => Ok(text.to_string()),
                None => Err(AppError::InvalidRequest("missing text".to_string())),
            }
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn test_execute_dispatches_and_reports_errors_as_text() {
        let mut toolbox = ToolBox::new();
        toolbox.add(Arc::new(EchoTool));

        assert_eq!(toolbox.execute(&call("echo", r#"{"text":"hi"}"#)).await, "hi");
        assert!(toolbox.execute(&call("echo", "{}")).await.starts_with("Error:"));
        assert!(toolbox.execute(&call("echo", "not json")).await.starts_with("Error:"));
        assert!(toolbox
            .execute(&call("missing", "{}"))
            .await
            .contains("unknown tool"));
    }

    #[test]
    fn test_paper_search_definitions() {
        let client = Arc::new(ArxivClient::new("http://localhost/api/query").unwrap());
        let toolbox = ToolBox::paper_search(client, 10);
        let names: Vec<String> = toolbox.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["read_arxiv_papers", "search_arxiv_and_return_articles"]);
    }

    #[test]
    fn test_placeholder_ids_are_rejected() {
        let err = validated_ids(&["searched_id".to_string()]).unwrap_err();
        assert!(err.to_string().contains("searched_id"));
        assert!(validated_ids(&[]).is_err());

        let ids = validated_ids(&[
            "http://arxiv.org/abs/2401.01234v1".to_string(),
            "2401.00001".to_string(),
            "2401.00002".to_string(),
            "2401.00003".to_string(),
        ])
        .unwrap();
        assert_eq!(ids, vec!["2401.01234v1", "2401.00001", "2401.00002"]);
    }

    #[tokio::test]
    async fn test_search_tool_formats_results() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry>
                <id>http://arxiv.org/abs/2401.01234v1</id>
                <published>2024-01-02T00:00:00Z</published>
                <title>A Paper</title><summary>Abstract text.</summary>
                <author><name>A. Author</name></author>
                <link title="pdf" href="http://arxiv.org/pdf/2401.01234v1" rel="related"/>
                </entry></feed>"#,
            )
            .create_async()
            .await;

        let client = Arc::new(ArxivClient::new(&format!("{}/api/query", server.url())).unwrap());
        let toolbox = ToolBox::paper_search(client, 5);
        let output = toolbox
            .execute(&call("search_arxiv_and_return_articles", r#"{"query":"cat:cs.AI"}"#))
            .await;

        assert!(output.contains("ID: 2401.01234v1"));
        assert!(output.contains("PDF: http://arxiv.org/pdf/2401.01234v1"));
        assert!(output.contains("Abstract: Abstract text."));
    }
}
