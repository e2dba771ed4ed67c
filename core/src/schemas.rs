//! Domain models for OT threat-intelligence documents and queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AssetType, Protocol, Severity, SourceType, ThreatCategory};

/// A product affected by an advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedProduct {
    pub vendor: String,
    pub product: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// ICS-CERT-style security advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    pub id: String,
    pub title: String,
    pub published: DateTime<Utc>,
    pub severity: Severity,
    pub affected_products: Vec<AffectedProduct>,
    pub protocols: Vec<Protocol>,
    pub cve_ids: Vec<String>,
    pub description: String,
    pub mitigations: Vec<String>,
    #[serde(default = "default_advisory_source")]
    pub source: String,
}

fn default_advisory_source() -> String {
    "ICS-CERT".to_string()
}

/// Threat intelligence report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatReport {
    pub id: String,
    pub title: String,
    pub published: DateTime<Utc>,
    pub threat_category: ThreatCategory,
    #[serde(default)]
    pub actor: Option<String>,
    pub targets: Vec<AssetType>,
    pub protocols: Vec<Protocol>,
    /// MITRE ATT&CK technique IDs.
    #[serde(default)]
    pub ttps: Vec<String>,
    pub summary: String,
    pub content: String,
    /// Indicators of compromise.
    #[serde(default)]
    pub iocs: Vec<String>,
}

/// OT security incident record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub reported: DateTime<Utc>,
    pub sector: String,
    pub asset_types: Vec<AssetType>,
    pub protocols: Vec<Protocol>,
    pub description: String,
    pub impact: String,
    #[serde(default)]
    pub related_advisory_ids: Vec<String>,
}

/// A chunk of a source document with optional embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Deterministic chunk identifier derived from the source id and
    /// chunk index.
    pub id: String,

    /// Identifier of the source document this chunk came from.
    pub source_id: String,

    /// Kind of source document.
    pub source_type: SourceType,

    /// The chunk text.
    pub content: String,

    /// Structured metadata carried over from the source document, plus a
    /// `chunk_index` field.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Embedding vector, present once the chunk has been indexed.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl DocumentChunk {
    /// Read a metadata field as a string, if present.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(serde_json::Value::as_str)
    }

    /// Read a metadata field as a list of strings, if present.
    pub fn metadata_strs(&self, key: &str) -> Option<Vec<&str>> {
        let values = self.metadata.get(key)?.as_array()?;
        Some(values.iter().filter_map(serde_json::Value::as_str).collect())
    }
}

/// Optional filters for narrowing search results.
///
/// Absence of a field means no constraint on that dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryFilters {
    #[serde(default)]
    pub severity: Option<Vec<Severity>>,
    #[serde(default)]
    pub protocols: Option<Vec<Protocol>>,
    #[serde(default)]
    pub asset_types: Option<Vec<AssetType>>,
    #[serde(default)]
    pub threat_categories: Option<Vec<ThreatCategory>>,
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
}

impl QueryFilters {
    /// Whether no dimension carries a constraint.
    pub fn is_empty(&self) -> bool {
        self.severity.is_none()
            && self.protocols.is_none()
            && self.asset_types.is_none()
            && self.threat_categories.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

/// Analyst query to the research assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub filters: Option<QueryFilters>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    10
}

/// A citation linking an answer to a source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub source_id: String,
    pub source_type: SourceType,
    pub title: String,
    pub excerpt: String,
    pub relevance_score: f32,
}

/// A recommended document from the ranking system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub source_id: String,
    pub source_type: SourceType,
    pub title: String,
    pub reason: String,
    pub score: f32,
}

/// Metadata about an assistant response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub model_id: String,
    pub retrieval_time_ms: f64,
    pub generation_time_ms: f64,
    pub total_chunks_searched: usize,
    pub total_chunks_used: usize,
}

/// Structured response handed to the downstream answer-synthesis stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub recommendations: Vec<Recommendation>,
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chunk_round_trip() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("severity".to_string(), "critical".into());
        metadata.insert("chunk_index".to_string(), 0.into());

        let chunk = DocumentChunk {
            id: "abc123".to_string(),
            source_id: "ICSA-2024-001".to_string(),
            source_type: SourceType::Advisory,
            content: "Buffer overflow in PLC firmware".to_string(),
            metadata,
            embedding: Some(vec![0.1, 0.2, 0.3]),
        };

        let json = serde_json::to_string(&chunk).unwrap();
        let back: DocumentChunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, chunk.id);
        assert_eq!(back.metadata_str("severity"), Some("critical"));
        assert_eq!(back.embedding, chunk.embedding);
    }

    #[test]
    fn test_chunk_embedding_defaults_to_none() {
        let json = r#"{
            "id": "abc",
            "source_id": "TR-1",
            "source_type": "threat_report",
            "content": "text"
        }"#;
        let chunk: DocumentChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.embedding, None);
        assert!(chunk.metadata.is_empty());
    }

    #[test]
    fn test_filters_is_empty() {
        assert!(QueryFilters::default().is_empty());
        let filters = QueryFilters {
            severity: Some(vec![Severity::Critical]),
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_query_request_default_max_results() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"question": "modbus attacks"}"#).unwrap();
        assert_eq!(request.max_results, 10);
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_metadata_strs() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("protocols".to_string(), serde_json::json!(["modbus", "dnp3"]));
        let chunk = DocumentChunk {
            id: "x".to_string(),
            source_id: "y".to_string(),
            source_type: SourceType::Incident,
            content: String::new(),
            metadata,
            embedding: None,
        };
        assert_eq!(chunk.metadata_strs("protocols"), Some(vec!["modbus", "dnp3"]));
        assert_eq!(chunk.metadata_strs("asset_types"), None);
    }
}
