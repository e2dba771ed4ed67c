//! Parse raw JSON documents into typed domain models.

use serde_json::Value;

use vigil_core::schemas::{Advisory, Incident, ThreatReport};

use crate::error::{IngestError, Result};

/// Parse raw JSON data into typed domain models.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser;

impl DocumentParser {
    /// Parse raw data into an [`Advisory`].
    pub fn parse_advisory(data: Value) -> Result<Advisory> {
        serde_json::from_value(data).map_err(|e| IngestError::InvalidDocument {
            source_type: "advisory",
            message: e.to_string(),
        })
    }

    /// Parse raw data into a [`ThreatReport`].
    pub fn parse_threat_report(data: Value) -> Result<ThreatReport> {
        serde_json::from_value(data).map_err(|e| IngestError::InvalidDocument {
            source_type: "threat_report",
            message: e.to_string(),
        })
    }

    /// Parse raw data into an [`Incident`].
    pub fn parse_incident(data: Value) -> Result<Incident> {
        serde_json::from_value(data).map_err(|e| IngestError::InvalidDocument {
            source_type: "incident",
            message: e.to_string(),
        })
    }

    /// Parse a list of raw advisory documents.
    pub fn parse_advisories(data: Vec<Value>) -> Result<Vec<Advisory>> {
        data.into_iter().map(Self::parse_advisory).collect()
    }

    /// Parse a list of raw threat report documents.
    pub fn parse_threat_reports(data: Vec<Value>) -> Result<Vec<ThreatReport>> {
        data.into_iter().map(Self::parse_threat_report).collect()
    }

    /// Parse a list of raw incident documents.
    pub fn parse_incidents(data: Vec<Value>) -> Result<Vec<Incident>> {
        data.into_iter().map(Self::parse_incident).collect()
    }
}
