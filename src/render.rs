//! Response rendering
//!
//! Maps the loosely-typed [`AgentReply`] into a fully-defaulted
//! [`SearchResponse`], and a `SearchResponse` into the small view
//! fragments the terminal prints: citation chips, the metrics line,
//! the follow-up list and the citation detail view.

use crate::agent::wire::{RawCitation, RawMetadata, RawSearchResponse};
use crate::agent::AgentReply;
use serde::Serialize;

/// Answer used when the agent reports no matching documents
pub const NO_DOCUMENTS_ANSWER: &str =
    "No documents found matching your query. Try uploading relevant PDF documents or rephrasing your question.";

/// Answer used when a successful reply omits `answer`
pub const EMPTY_ANSWER: &str = "The agent did not return an answer for this query.";

/// Agent message shown when the query fails in transport or decoding
pub const QUERY_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while searching your documents. Please try again.";

/// Document name used when a citation omits it
pub const UNKNOWN_DOCUMENT: &str = "Unknown document";

/// Processing time shown when the agent does not report one
pub const DEFAULT_PROCESSING_TIME: &str = "0s";

/// Display-ready search response with every field resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub documents_referenced: Vec<String>,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    pub follow_up_suggestions: Vec<String>,
    pub metadata: ResponseMetadata,
}

/// One evidence fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub document_name: String,
    pub page_number: u32,
    pub excerpt: String,
    /// Relevance in `[0, 1]`
    pub relevance_score: f64,
}

/// Retrieval metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    pub search_queries_used: Vec<String>,
    pub total_passages_retrieved: u64,
    pub processing_time: String,
}

impl Default for ResponseMetadata {
    fn default() -> Self {
        Self {
            search_queries_used: Vec::new(),
            total_passages_retrieved: 0,
            processing_time: DEFAULT_PROCESSING_TIME.to_string(),
        }
    }
}

impl SearchResponse {
    /// Build the display response for a decoded agent reply
    pub fn from_reply(reply: AgentReply) -> Self {
        match reply {
            AgentReply::Answer(raw) => Self::from_raw(raw),
            AgentReply::NoDocuments => Self::no_documents(),
        }
    }

    /// The fixed "no documents found" response with default metadata
    pub fn no_documents() -> Self {
        Self {
            answer: NO_DOCUMENTS_ANSWER.to_string(),
            citations: Vec::new(),
            documents_referenced: Vec::new(),
            confidence: 0.0,
            follow_up_suggestions: Vec::new(),
            metadata: ResponseMetadata::default(),
        }
    }

    fn from_raw(raw: RawSearchResponse) -> Self {
        Self {
            answer: raw.answer.unwrap_or_else(|| EMPTY_ANSWER.to_string()),
            citations: raw
                .citations
                .unwrap_or_default()
                .into_iter()
                .map(Citation::from_raw)
                .collect(),
            documents_referenced: raw.documents_referenced.unwrap_or_default(),
            confidence: clamp_unit(raw.confidence.unwrap_or(0.0)),
            follow_up_suggestions: raw.follow_up_suggestions.unwrap_or_default(),
            metadata: raw
                .metadata
                .map(ResponseMetadata::from_raw)
                .unwrap_or_default(),
        }
    }

    /// Confidence as a rounded percentage
    pub fn confidence_percent(&self) -> u32 {
        to_percent(self.confidence)
    }

    /// Follow-ups to display, in server order, at most `limit`
    pub fn follow_ups(&self, limit: usize) -> &[String] {
        let end = self.follow_up_suggestions.len().min(limit);
        &self.follow_up_suggestions[..end]
    }

    /// Citation chips, one per citation, in server order
    pub fn citation_chips(&self) -> Vec<CitationChip> {
        self.citations.iter().map(CitationChip::from).collect()
    }

    /// Metrics line shown under the answer
    pub fn metrics(&self) -> MetricsView {
        MetricsView {
            confidence_percent: self.confidence_percent(),
            documents_referenced: self.documents_referenced.len(),
            passages_retrieved: self.metadata.total_passages_retrieved,
            processing_time: self.metadata.processing_time.clone(),
        }
    }

    /// Detail view for the citation at `index` (zero-based)
    pub fn citation_detail(&self, index: usize) -> Option<CitationDetail> {
        self.citations.get(index).map(CitationDetail::from)
    }
}

impl Citation {
    fn from_raw(raw: RawCitation) -> Self {
        Self {
            document_name: raw
                .document_name
                .unwrap_or_else(|| UNKNOWN_DOCUMENT.to_string()),
            page_number: raw.page_number.unwrap_or(0),
            excerpt: raw.excerpt.unwrap_or_default(),
            relevance_score: clamp_unit(raw.relevance_score.unwrap_or(0.0)),
        }
    }

    /// Relevance as a rounded percentage
    pub fn relevance_percent(&self) -> u32 {
        to_percent(self.relevance_score)
    }
}

impl ResponseMetadata {
    fn from_raw(raw: RawMetadata) -> Self {
        Self {
            search_queries_used: raw.search_queries_used.unwrap_or_default(),
            total_passages_retrieved: raw.total_passages_retrieved.unwrap_or(0),
            processing_time: raw
                .processing_time
                .unwrap_or_else(|| DEFAULT_PROCESSING_TIME.to_string()),
        }
    }
}

/// Compact citation label, e.g. `terms.pdf p.4`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationChip {
    pub label: String,
    pub relevance_percent: u32,
}

impl From<&Citation> for CitationChip {
    fn from(citation: &Citation) -> Self {
        Self {
            label: format!("{} p.{}", citation.document_name, citation.page_number),
            relevance_percent: citation.relevance_percent(),
        }
    }
}

/// Metrics shown under an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsView {
    pub confidence_percent: u32,
    pub documents_referenced: usize,
    pub passages_retrieved: u64,
    pub processing_time: String,
}

/// Full view of a selected citation, keyed on its own field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationDetail {
    pub document_name: String,
    pub page_number: u32,
    pub relevance_percent: u32,
    pub excerpt: String,
}

impl From<&Citation> for CitationDetail {
    fn from(citation: &Citation) -> Self {
        Self {
            document_name: citation.document_name.clone(),
            page_number: citation.page_number,
            relevance_percent: citation.relevance_percent(),
            excerpt: citation.excerpt.clone(),
        }
    }
}

/// Clamp a score into `[0, 1]`; non-finite values become 0
fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn to_percent(score: f64) -> u32 {
    (score * 100.0).round() as u32
}
