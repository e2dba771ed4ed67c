//! # Vigil Core
//!
//! Shared domain types for the vigil threat-intelligence retrieval system:
//!
//! - **Enums**: ICS/OT protocols, asset types, severities, threat categories
//! - **Schemas**: advisories, threat reports, incidents, document chunks,
//!   query filters and response shapes
//! - **Settings**: runtime configuration with environment overrides

pub mod config;
pub mod enums;
pub mod schemas;

pub use config::Settings;
pub use enums::{AssetType, Protocol, Severity, SourceType, ThreatCategory};
pub use schemas::{
    Advisory, AffectedProduct, Citation, DocumentChunk, Incident, QueryFilters, QueryRequest,
    QueryResponse, Recommendation, ResponseMetadata, ThreatReport,
};
