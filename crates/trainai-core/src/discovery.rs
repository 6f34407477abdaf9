//! Discovery service: crawling, document search and selector evaluation
//!
//! Only a canned implementation exists. It answers with fixed data for the
//! Jira "create epic" task so the HTTP surface can be exercised end to end.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Selectors the mock crawler reports and the mock evaluator accepts
pub const KNOWN_SELECTORS: [&str; 3] = [
    "button:has-text('Create')",
    "input[name='summary']",
    "textarea[name='description']",
];

const MOCK_ROUTES: [&str; 2] = ["/projects/ABC/issues", "/secure/CreateIssue!default.jspa"];
const MOCK_SNIPPETS: [&str; 4] = ["Create", "Epic", "Summary", "Description"];
const EVALUATION_NOTES: &str = "mock evaluation";

/// Routes, selectors and text found on a crawled application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub routes: Vec<String>,
    pub selectors: Vec<String>,
    pub snippets: Vec<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
}

/// A document fragment matched by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocChunk {
    #[serde(rename = "ref")]
    pub reference: String,
    pub text: String,
}

/// Outcome of checking a selector against a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub valid: bool,
    pub notes: Option<String>,
}

/// Source of crawl, search and evaluation results
pub trait DiscoveryService: Send + Sync {
    /// Crawl `url` up to `depth` links deep
    fn crawl(&self, url: &str, depth: i64) -> CrawlResult;

    /// Search reference documentation
    fn doc_search(&self, query: &str) -> Vec<DocChunk>;

    /// Check whether `selector` resolves on `route`
    fn evaluate(&self, selector: &str, route: Option<&str>) -> Evaluation;
}

/// Fixed-response discovery service
#[derive(Debug, Clone, Default)]
pub struct MockDiscoveryService;

impl MockDiscoveryService {
    pub fn new() -> Self {
        Self
    }
}

impl DiscoveryService for MockDiscoveryService {
    fn crawl(&self, url: &str, depth: i64) -> CrawlResult {
        debug!(%url, depth, "Mock crawl");

        CrawlResult {
            url: url.to_string(),
            routes: MOCK_ROUTES.iter().map(|r| r.to_string()).collect(),
            selectors: KNOWN_SELECTORS.iter().map(|s| s.to_string()).collect(),
            snippets: MOCK_SNIPPETS.iter().map(|s| s.to_string()).collect(),
            screenshots: Vec::new(),
        }
    }

    fn doc_search(&self, query: &str) -> Vec<DocChunk> {
        debug!(%query, "Mock doc search");

        vec![DocChunk {
            reference: "pdf://jira_guide#p12".to_string(),
            text: "To create an Epic, click Create, choose Epic, and enter Summary...".to_string(),
        }]
    }

    fn evaluate(&self, selector: &str, route: Option<&str>) -> Evaluation {
        debug!(%selector, ?route, "Mock evaluate");

        Evaluation {
            valid: KNOWN_SELECTORS.iter().any(|known| *known == selector),
            notes: Some(EVALUATION_NOTES.to_string()),
        }
    }
}
