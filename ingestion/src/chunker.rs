//! Overlapping word-window chunking for document embedding.
//!
//! Documents are flattened to text, split on whitespace, and emitted as
//! sliding windows of `chunk_size` words with `chunk_overlap` words
//! repeated between consecutive windows. Chunk ids are deterministic, so
//! re-chunking identical input is idempotent.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use vigil_core::schemas::{Advisory, DocumentChunk, Incident, ThreatReport};
use vigil_core::{Settings, SourceType};

/// Split documents into overlapping text chunks for embedding.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a chunker from settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }

    /// Create a chunker with an explicit window and overlap.
    pub fn with_window(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into overlapping chunks.
    ///
    /// Each chunk carries the caller-supplied metadata plus a
    /// `chunk_index` field. Empty or whitespace-only text yields no
    /// chunks. The final window may be shorter than `chunk_size`.
    pub fn chunk_text(
        &self,
        text: &str,
        source_id: &str,
        source_type: SourceType,
        metadata: Map<String, Value>,
    ) -> Vec<DocumentChunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        // An overlap at or above the window size would stall the window;
        // the advance is clamped to at least one word.
        let step = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0u32;
        while start < words.len() {
            let end = start + self.chunk_size;
            let content = words[start..end.min(words.len())].join(" ");

            let mut chunk_metadata = metadata.clone();
            chunk_metadata.insert("chunk_index".to_string(), chunk_index.into());

            chunks.push(DocumentChunk {
                id: generate_chunk_id(source_id, chunk_index),
                source_id: source_id.to_string(),
                source_type,
                content,
                metadata: chunk_metadata,
                embedding: None,
            });

            chunk_index += 1;
            if end >= words.len() {
                break;
            }
            start += step;
        }
        chunks
    }

    /// Chunk an advisory into document chunks.
    pub fn chunk_advisory(&self, advisory: &Advisory) -> Vec<DocumentChunk> {
        let mitigations = advisory
            .mitigations
            .iter()
            .map(|m| format!("- {m}"))
            .collect::<Vec<_>>()
            .join("\n");
        let text = format!(
            "{}\n\n{}\n\nMitigations:\n{mitigations}",
            advisory.title, advisory.description
        );

        let mut metadata = Map::new();
        metadata.insert("severity".to_string(), advisory.severity.as_str().into());
        metadata.insert(
            "protocols".to_string(),
            string_list(advisory.protocols.iter().map(|p| p.as_str())),
        );
        metadata.insert(
            "cve_ids".to_string(),
            string_list(advisory.cve_ids.iter().map(String::as_str)),
        );
        metadata.insert("source".to_string(), advisory.source.clone().into());
        metadata.insert(
            "published".to_string(),
            advisory.published.to_rfc3339().into(),
        );

        self.chunk_text(&text, &advisory.id, SourceType::Advisory, metadata)
    }

    /// Chunk a threat report into document chunks.
    pub fn chunk_threat_report(&self, report: &ThreatReport) -> Vec<DocumentChunk> {
        let text = format!("{}\n\n{}\n\n{}", report.title, report.summary, report.content);

        let mut metadata = Map::new();
        metadata.insert(
            "threat_category".to_string(),
            report.threat_category.as_str().into(),
        );
        if let Some(actor) = &report.actor {
            metadata.insert("actor".to_string(), actor.clone().into());
        }
        metadata.insert(
            "targets".to_string(),
            string_list(report.targets.iter().map(|t| t.as_str())),
        );
        metadata.insert(
            "protocols".to_string(),
            string_list(report.protocols.iter().map(|p| p.as_str())),
        );
        metadata.insert(
            "ttps".to_string(),
            string_list(report.ttps.iter().map(String::as_str)),
        );
        metadata.insert("published".to_string(), report.published.to_rfc3339().into());

        self.chunk_text(&text, &report.id, SourceType::ThreatReport, metadata)
    }

    /// Chunk an incident record into document chunks.
    pub fn chunk_incident(&self, incident: &Incident) -> Vec<DocumentChunk> {
        let text = format!(
            "Incident in {} sector\n\n{}\n\nImpact: {}",
            incident.sector, incident.description, incident.impact
        );

        let mut metadata = Map::new();
        metadata.insert("sector".to_string(), incident.sector.clone().into());
        metadata.insert(
            "asset_types".to_string(),
            string_list(incident.asset_types.iter().map(|a| a.as_str())),
        );
        metadata.insert(
            "protocols".to_string(),
            string_list(incident.protocols.iter().map(|p| p.as_str())),
        );
        metadata.insert(
            "reported".to_string(),
            incident.reported.to_rfc3339().into(),
        );

        self.chunk_text(&text, &incident.id, SourceType::Incident, metadata)
    }
}

/// Deterministic chunk id: the first 16 hex characters of
/// SHA-256 of `"{source_id}::{chunk_index}"`.
pub fn generate_chunk_id(source_id: &str, chunk_index: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{source_id}::{chunk_index}").as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

fn string_list<'a>(values: impl Iterator<Item = &'a str>) -> Value {
    Value::Array(values.map(|v| Value::String(v.to_string())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use vigil_core::enums::{Protocol, Severity};
    use vigil_core::schemas::AffectedProduct;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = TextChunker::with_window(10, 2);
        assert!(chunker
            .chunk_text("", "doc", SourceType::Advisory, Map::new())
            .is_empty());
        assert!(chunker
            .chunk_text("   \n\t  ", "doc", SourceType::Advisory, Map::new())
            .is_empty());
    }

    #[test]
    fn test_single_window_when_text_fits() {
        let chunker = TextChunker::with_window(10, 2);
        let chunks = chunker.chunk_text(&words(7), "doc", SourceType::Advisory, Map::new());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content.split_whitespace().count(), 7);
    }

    #[test]
    fn test_window_count_and_overlap() {
        // 25 words, size 10, overlap 2 → step 8 → windows at 0, 8, 16.
        // ceil((25 - 2) / (10 - 2)) = 3.
        let chunker = TextChunker::with_window(10, 2);
        let chunks = chunker.chunk_text(&words(25), "doc", SourceType::Advisory, Map::new());
        assert_eq!(chunks.len(), 3);

        for chunk in &chunks {
            assert!(chunk.content.split_whitespace().count() <= 10);
        }

        // Consecutive windows repeat exactly `overlap` words.
        for pair in chunks.windows(2) {
            let left: Vec<&str> = pair[0].content.split_whitespace().collect();
            let right: Vec<&str> = pair[1].content.split_whitespace().collect();
            assert_eq!(&left[left.len() - 2..], &right[..2]);
        }

        // Last window holds the 9-word remainder.
        let last: Vec<&str> = chunks[2].content.split_whitespace().collect();
        assert_eq!(last.len(), 9);
        assert_eq!(last[0], "w16");
        assert_eq!(last[8], "w24");
    }

    #[test]
    fn test_overlap_at_window_size_still_terminates() {
        // overlap >= size would stall without the clamped advance.
        let chunker = TextChunker::with_window(4, 4);
        let chunks = chunker.chunk_text(&words(10), "doc", SourceType::Advisory, Map::new());
        // Advance of one word per window: starts 0..=6 until the window
        // reaches the end.
        assert_eq!(chunks.len(), 7);
        let chunker = TextChunker::with_window(4, 9);
        let chunks = chunker.chunk_text(&words(10), "doc", SourceType::Advisory, Map::new());
        assert_eq!(chunks.len(), 7);
    }

    #[test]
    fn test_chunk_index_metadata() {
        let chunker = TextChunker::with_window(5, 1);
        let mut metadata = Map::new();
        metadata.insert("severity".to_string(), "high".into());
        let chunks = chunker.chunk_text(&words(12), "doc", SourceType::Advisory, metadata);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata["chunk_index"], serde_json::json!(i));
            assert_eq!(chunk.metadata_str("severity"), Some("high"));
        }
    }

    #[test]
    fn test_chunk_id_deterministic() {
        let a = generate_chunk_id("ICSA-2024-001", 0);
        let b = generate_chunk_id("ICSA-2024-001", 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, generate_chunk_id("ICSA-2024-001", 1));
        assert_ne!(a, generate_chunk_id("ICSA-2024-002", 0));
    }

    #[test]
    fn test_chunk_advisory_metadata() {
        let advisory = Advisory {
            id: "ICSA-2024-001".to_string(),
            title: "PLC Buffer Overflow".to_string(),
            published: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            severity: Severity::Critical,
            affected_products: vec![AffectedProduct {
                vendor: "Siemens".to_string(),
                product: "SIMATIC S7-1500".to_string(),
                version: None,
            }],
            protocols: vec![Protocol::Modbus, Protocol::OpcUa],
            cve_ids: vec!["CVE-2024-12345".to_string()],
            description: "A buffer overflow vulnerability exists.".to_string(),
            mitigations: vec!["Update firmware".to_string()],
            source: "ICS-CERT".to_string(),
        };

        let chunker = TextChunker::with_window(512, 64);
        let chunks = chunker.chunk_advisory(&advisory);
        assert_eq!(chunks.len(), 1);

        let chunk = &chunks[0];
        assert_eq!(chunk.source_id, "ICSA-2024-001");
        assert_eq!(chunk.source_type, SourceType::Advisory);
        assert_eq!(chunk.metadata_str("severity"), Some("critical"));
        assert_eq!(
            chunk.metadata_strs("protocols"),
            Some(vec!["modbus", "opc-ua"])
        );
        assert!(chunk.content.contains("Mitigations:"));
        assert!(chunk.content.contains("- Update firmware"));
    }
}
