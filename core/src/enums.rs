//! OT threat-intelligence domain enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// ICS/OT communication protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    Modbus,
    Dnp3,
    #[serde(rename = "opc-ua")]
    OpcUa,
    EthernetIp,
    Profinet,
    Bacnet,
    #[serde(rename = "iec-61850")]
    Iec61850,
    #[serde(rename = "iec-104")]
    Iec104,
}

impl Protocol {
    /// All known protocols.
    pub const ALL: [Protocol; 8] = [
        Protocol::Modbus,
        Protocol::Dnp3,
        Protocol::OpcUa,
        Protocol::EthernetIp,
        Protocol::Profinet,
        Protocol::Bacnet,
        Protocol::Iec61850,
        Protocol::Iec104,
    ];

    /// The wire/metadata string value for this protocol.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Modbus => "modbus",
            Protocol::Dnp3 => "dnp3",
            Protocol::OpcUa => "opc-ua",
            Protocol::EthernetIp => "ethernet-ip",
            Protocol::Profinet => "profinet",
            Protocol::Bacnet => "bacnet",
            Protocol::Iec61850 => "iec-61850",
            Protocol::Iec104 => "iec-104",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ICS/OT asset types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetType {
    Plc,
    Rtu,
    Hmi,
    Scada,
    Dcs,
    Historian,
    EngineeringWorkstation,
    SafetySystem,
}

impl AssetType {
    /// All known asset types.
    pub const ALL: [AssetType; 8] = [
        AssetType::Plc,
        AssetType::Rtu,
        AssetType::Hmi,
        AssetType::Scada,
        AssetType::Dcs,
        AssetType::Historian,
        AssetType::EngineeringWorkstation,
        AssetType::SafetySystem,
    ];

    /// The wire/metadata string value for this asset type.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Plc => "plc",
            AssetType::Rtu => "rtu",
            AssetType::Hmi => "hmi",
            AssetType::Scada => "scada",
            AssetType::Dcs => "dcs",
            AssetType::Historian => "historian",
            AssetType::EngineeringWorkstation => "engineering-workstation",
            AssetType::SafetySystem => "safety-system",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severity levels, most severe first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// The wire/metadata string value for this severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threat intelligence categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreatCategory {
    Ransomware,
    Apt,
    SupplyChain,
    Insider,
    Vulnerability,
}

impl ThreatCategory {
    /// All threat categories.
    pub const ALL: [ThreatCategory; 5] = [
        ThreatCategory::Ransomware,
        ThreatCategory::Apt,
        ThreatCategory::SupplyChain,
        ThreatCategory::Insider,
        ThreatCategory::Vulnerability,
    ];

    /// The wire/metadata string value for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            ThreatCategory::Ransomware => "ransomware",
            ThreatCategory::Apt => "apt",
            ThreatCategory::SupplyChain => "supply-chain",
            ThreatCategory::Insider => "insider",
            ThreatCategory::Vulnerability => "vulnerability",
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of source document a chunk was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Advisory,
    ThreatReport,
    Incident,
}

impl SourceType {
    /// The wire/metadata string value for this source type.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Advisory => "advisory",
            SourceType::ThreatReport => "threat_report",
            SourceType::Incident => "incident",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
