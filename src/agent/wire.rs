//! Wire types for the document-search agent endpoint
//!
//! The agent answers with `{ "success": bool, "response": ... }` where
//! `response` is either a JSON object or a JSON-encoded string holding
//! that object. The union is resolved here so the rest of the crate only
//! sees [`AgentReply`].

use crate::error::{DocQueryError, Result};
use serde::{Deserialize, Serialize};

/// Request body POSTed to the agent endpoint
#[derive(Debug, Serialize)]
pub struct AgentRequest<'a> {
    pub message: &'a str,
    pub agent_id: &'a str,
}

/// Outer response envelope
#[derive(Debug, Deserialize)]
pub struct AgentEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<ResponseField>,
}

/// The `response` field in either of its two wire shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResponseField {
    /// A JSON string that must itself be parsed as JSON
    Encoded(String),
    /// An inline JSON object
    Object(RawSearchResponse),
}

/// Search response exactly as the server sent it; every field may be absent
///
/// Fields decode one at a time: a value of the wrong shape becomes `None`
/// and the renderer default applies to that field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default, deserialize_with = "lenient::value")]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub citations: Option<Vec<RawCitation>>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub documents_referenced: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub follow_up_suggestions: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub metadata: Option<RawMetadata>,
}

/// Citation as sent by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCitation {
    #[serde(default, deserialize_with = "lenient::value")]
    pub document_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub page_number: Option<u32>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub relevance_score: Option<f64>,
}

/// Retrieval metadata as sent by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default, deserialize_with = "lenient::value")]
    pub search_queries_used: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_passages_retrieved: Option<u64>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub processing_time: Option<String>,
}

/// Per-field decoders that map a malformed value to `None`
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Any deserializable value; wrong shapes become `None`
    pub fn value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| serde_json::from_value(v).ok()))
    }

    /// Non-negative whole number, written as an integer, a float with no
    /// fractional part (`4.0`), or a numeric string
    pub fn count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(whole_number)
            .and_then(|n| T::try_from(n).ok()))
    }

    /// Finite float, written as a number or a numeric string
    pub fn score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .filter(|score| score.is_finite()))
    }

    fn whole_number(value: &Value) -> Option<u64> {
        let float = match value {
            Value::Number(n) => {
                if let Some(n) = n.as_u64() {
                    return Some(n);
                }
                n.as_f64()?
            }
            Value::String(s) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<u64>() {
                    return Some(n);
                }
                s.parse::<f64>().ok()?
            }
            _ => return None,
        };

        if float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 {
            Some(float as u64)
        } else {
            None
        }
    }
}

/// Decoded agent reply
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    /// The agent produced a (possibly sparse) search response
    Answer(RawSearchResponse),
    /// `success` was false or no response was attached
    NoDocuments,
}

impl AgentEnvelope {
    /// Resolve the envelope into an [`AgentReply`]
    ///
    /// # Errors
    ///
    /// Returns `DocQueryError::Decode` when a string-encoded response is
    /// not a valid search response object.
    pub fn into_reply(self) -> Result<AgentReply> {
        if !self.success {
            return Ok(AgentReply::NoDocuments);
        }

        match self.response {
            None => Ok(AgentReply::NoDocuments),
            Some(ResponseField::Object(raw)) => Ok(AgentReply::Answer(raw)),
            Some(ResponseField::Encoded(text)) => {
                let raw: RawSearchResponse = serde_json::from_str(&text).map_err(|e| {
                    DocQueryError::Decode(format!("Encoded response is not valid JSON: {}", e))
                })?;
                Ok(AgentReply::Answer(raw))
            }
        }
    }
}

/// Decode a raw response body into an [`AgentReply`]
///
/// # Errors
///
/// Returns `DocQueryError::Decode` for malformed JSON at either level.
pub fn decode_reply(body: &str) -> Result<AgentReply> {
    let envelope: AgentEnvelope = serde_json::from_str(body)
        .map_err(|e| DocQueryError::Decode(format!("Malformed agent response: {}", e)))?;
    envelope.into_reply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = AgentRequest {
            message: "What is the refund policy?",
            agent_id: "document-search-agent",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "message": "What is the refund policy?",
                "agent_id": "document-search-agent"
            })
        );
    }

    #[test]
    fn test_decode_object_response() {
        let body = r#"{"success":true,"response":{"answer":"30 days","confidence":0.82,
            "citations":[{"document_name":"terms.pdf","page_number":4,"excerpt":"...","relevance_score":0.9}]}}"#;

        let reply = decode_reply(body).unwrap();
        let AgentReply::Answer(raw) = reply else {
            panic!("expected an answer");
        };
        assert_eq!(raw.answer.as_deref(), Some("30 days"));
        assert_eq!(raw.confidence, Some(0.82));
        let citations = raw.citations.unwrap();
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].page_number, Some(4));
    }

    #[test]
    fn test_decode_string_encoded_response_matches_object() {
        let inner = r#"{"answer":"30 days","follow_up_suggestions":["a","b"]}"#;
        let encoded = serde_json::json!({ "success": true, "response": inner }).to_string();
        let object = format!(r#"{{"success":true,"response":{}}}"#, inner);

        assert_eq!(decode_reply(&encoded).unwrap(), decode_reply(&object).unwrap());
    }

    #[test]
    fn test_decode_success_false_is_no_documents() {
        assert_eq!(
            decode_reply(r#"{"success":false}"#).unwrap(),
            AgentReply::NoDocuments
        );
    }

    #[test]
    fn test_decode_missing_success_is_no_documents() {
        assert_eq!(
            decode_reply(r#"{"response":{"answer":"ignored"}}"#).unwrap(),
            AgentReply::NoDocuments
        );
    }

    #[test]
    fn test_decode_missing_response_is_no_documents() {
        assert_eq!(
            decode_reply(r#"{"success":true}"#).unwrap(),
            AgentReply::NoDocuments
        );
        assert_eq!(
            decode_reply(r#"{"success":true,"response":null}"#).unwrap(),
            AgentReply::NoDocuments
        );
    }

    #[test]
    fn test_decode_empty_object_is_sparse_answer() {
        let reply = decode_reply(r#"{"success":true,"response":{}}"#).unwrap();
        assert_eq!(reply, AgentReply::Answer(RawSearchResponse::default()));
    }

    #[test]
    fn test_decode_whole_floats_as_counts() {
        let body = r#"{"success":true,"response":{"answer":"30 days","confidence":0.82,
            "citations":[{"document_name":"terms.pdf","page_number":4.0,"excerpt":"...","relevance_score":0.9}],
            "metadata":{"total_passages_retrieved":7.0,"processing_time":"1.2s"}}}"#;

        let AgentReply::Answer(raw) = decode_reply(body).unwrap() else {
            panic!("expected an answer");
        };
        assert_eq!(raw.answer.as_deref(), Some("30 days"));
        assert_eq!(raw.citations.unwrap()[0].page_number, Some(4));
        assert_eq!(raw.metadata.unwrap().total_passages_retrieved, Some(7));
    }

    #[test]
    fn test_decode_bad_field_defaults_alone() {
        let body = r#"{"success":true,"response":{"answer":"30 days","confidence":"high",
            "citations":[{"document_name":"terms.pdf","page_number":-3,"relevance_score":0.9},
                         {"document_name":"faq.pdf","page_number":2.5}],
            "follow_up_suggestions":"not a list",
            "metadata":{"total_passages_retrieved":"7","processing_time":12}}}"#;

        let AgentReply::Answer(raw) = decode_reply(body).unwrap() else {
            panic!("expected an answer");
        };
        assert_eq!(raw.answer.as_deref(), Some("30 days"));
        assert_eq!(raw.confidence, None);
        assert_eq!(raw.follow_up_suggestions, None);

        let citations = raw.citations.unwrap();
        assert_eq!(citations[0].document_name.as_deref(), Some("terms.pdf"));
        assert_eq!(citations[0].page_number, None);
        assert_eq!(citations[0].relevance_score, Some(0.9));
        assert_eq!(citations[1].page_number, None);

        let metadata = raw.metadata.unwrap();
        assert_eq!(metadata.total_passages_retrieved, Some(7));
        assert_eq!(metadata.processing_time, None);
    }

    #[test]
    fn test_decode_numeric_string_confidence() {
        let body = r#"{"success":true,"response":{"confidence":"0.82"}}"#;
        let AgentReply::Answer(raw) = decode_reply(body).unwrap() else {
            panic!("expected an answer");
        };
        assert_eq!(raw.confidence, Some(0.82));
    }

    #[test]
    fn test_decode_bad_field_in_encoded_response() {
        let inner = r#"{"answer":"30 days","citations":[{"document_name":"terms.pdf","page_number":4.0}]}"#;
        let body = serde_json::json!({ "success": true, "response": inner }).to_string();
        let AgentReply::Answer(raw) = decode_reply(&body).unwrap() else {
            panic!("expected an answer");
        };
        assert_eq!(raw.citations.unwrap()[0].page_number, Some(4));
    }

    #[test]
    fn test_decode_malformed_body_fails() {
        let err = decode_reply("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(err.to_string().contains("Malformed agent response"));
    }

    #[test]
    fn test_decode_malformed_encoded_response_fails() {
        let err = decode_reply(r#"{"success":true,"response":"{not json"}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocQueryError>(),
            Some(DocQueryError::Decode(_))
        ));
    }
}
