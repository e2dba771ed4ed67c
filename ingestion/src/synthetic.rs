//! Seeded synthetic OT threat-intelligence corpus for development and
//! testing.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use vigil_core::enums::{AssetType, Protocol, Severity, ThreatCategory};
use vigil_core::schemas::{Advisory, AffectedProduct, Incident, ThreatReport};

const VENDORS: [(&str, [&str; 5]); 10] = [
    (
        "Siemens",
        ["SIMATIC S7-1500", "SIMATIC S7-1200", "SIMATIC S7-300", "SINUMERIK 840D", "SCALANCE X200"],
    ),
    (
        "Schneider Electric",
        ["Modicon M340", "Modicon M580", "Modicon Premium", "EcoStruxure Control Expert", "PowerLogic PM8000"],
    ),
    (
        "Rockwell Automation",
        ["ControlLogix 5580", "CompactLogix 5380", "MicroLogix 1400", "FactoryTalk View SE", "PowerFlex 755T"],
    ),
    (
        "ABB",
        ["AC500 PLC", "Symphony Plus", "Ability 800xA", "REF615 Relay", "ACS880 Drive"],
    ),
    (
        "Honeywell",
        ["ControlEdge PLC", "Experion PKS", "Safety Manager SC", "C300 Controller", "HC900 Controller"],
    ),
    (
        "Emerson",
        ["DeltaV DCS", "ROC800 RTU", "AMS Device Manager", "Ovation DCS", "DeltaV SIS"],
    ),
    (
        "GE Vernova",
        ["Mark VIe Controller", "PACSystems RX3i", "UR Relays", "OpShield", "CIMPLICITY HMI"],
    ),
    (
        "Yokogawa",
        ["CENTUM VP DCS", "ProSafe-RS SIS", "STARDOM RTU", "FA-M3V PLC", "FAST/TOOLS SCADA"],
    ),
    (
        "Mitsubishi Electric",
        ["MELSEC iQ-R", "MELSEC iQ-F", "GOT2000 HMI", "CC-Link IE", "GENESIS64 SCADA"],
    ),
    (
        "Phoenix Contact",
        ["PLCnext Control", "mGuard Firewall", "FL SWITCH", "RFC 470S", "ILC 2050 BI"],
    ),
];

const THREAT_ACTORS: [&str; 10] = [
    "VOLTZITE", "KAMACITE", "ELECTRUM", "COVELLITE", "XENOTIME", "CHRYSENE", "MAGNALLIUM",
    "DYMALLOY", "RASPITE", "WASSONITE",
];

const SECTORS: [&str; 8] = [
    "energy",
    "water",
    "manufacturing",
    "oil-and-gas",
    "chemical",
    "transportation",
    "pharmaceuticals",
    "food-and-beverage",
];

const ATTACK_TECHNIQUES: [(&str, &str); 20] = [
    ("T0800", "Activate Firmware Update Mode"),
    ("T0831", "Manipulation of Control"),
    ("T0855", "Unauthorized Command Message"),
    ("T0836", "Modify Parameter"),
    ("T0839", "Module Firmware"),
    ("T0821", "Modify Controller Tasking"),
    ("T0843", "Program Download"),
    ("T0809", "Data Destruction"),
    ("T0813", "Denial of Control"),
    ("T0826", "Loss of Availability"),
    ("T0827", "Loss of Control"),
    ("T0828", "Loss of Productivity and Revenue"),
    ("T0837", "Loss of Protection"),
    ("T0880", "Loss of Safety"),
    ("T0829", "Loss of View"),
    ("T0856", "Spoof Reporting Message"),
    ("T0862", "Supply Chain Compromise"),
    ("T0860", "Wireless Compromise"),
    ("T0866", "Exploitation of Remote Services"),
    ("T0886", "Remote Services"),
];

const VULN_TYPES: [&str; 15] = [
    "buffer overflow",
    "authentication bypass",
    "hard-coded credentials",
    "improper input validation",
    "path traversal",
    "command injection",
    "integer overflow",
    "use-after-free",
    "uncontrolled resource consumption",
    "improper access control",
    "cleartext transmission of sensitive data",
    "cross-site scripting",
    "SQL injection",
    "deserialization of untrusted data",
    "stack-based buffer overflow",
];

/// Seeded generator for a synthetic development corpus.
///
/// Identical seeds produce identical corpora.
pub struct SyntheticCorpus {
    rng: StdRng,
}

impl SyntheticCorpus {
    /// Create a generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate synthetic ICS advisories.
    pub fn advisories(&mut self, count: usize) -> Vec<Advisory> {
        (1..=count).map(|i| self.advisory(i)).collect()
    }

    /// Generate synthetic threat reports.
    pub fn threat_reports(&mut self, count: usize) -> Vec<ThreatReport> {
        (1..=count).map(|i| self.threat_report(i)).collect()
    }

    /// Generate synthetic incident records.
    pub fn incidents(&mut self, count: usize) -> Vec<Incident> {
        (1..=count).map(|i| self.incident(i)).collect()
    }

    fn advisory(&mut self, seq: usize) -> Advisory {
        let (vendor, products) = VENDORS.choose(&mut self.rng).copied().unwrap_or(VENDORS[0]);
        let product = products.choose(&mut self.rng).copied().unwrap_or(products[0]);
        let vuln_type = VULN_TYPES.choose(&mut self.rng).copied().unwrap_or(VULN_TYPES[0]);
        let severity = *Severity::ALL.choose(&mut self.rng).unwrap_or(&Severity::Medium);
        let protocols = self.pick_protocols(1, 3);
        let published = self.random_date();
        let protocol_list = join_protocols(&protocols);

        let effect = if matches!(severity, Severity::Critical | Severity::High) {
            "execute arbitrary code"
        } else {
            "cause a denial of service condition"
        };

        let cve_count = self.rng.random_range(1..=3);
        let cve_ids = (0..cve_count)
            .map(|_| format!("CVE-{}-{}", published.year(), self.rng.random_range(10000..=99999)))
            .collect();

        Advisory {
            id: format!("ICSA-{}-{seq:03}", published.year()),
            title: format!("{vendor} {product} {}", title_case(vuln_type)),
            published,
            severity,
            affected_products: vec![AffectedProduct {
                vendor: vendor.to_string(),
                product: product.to_string(),
                version: Some(format!(
                    "<{}.{}.{}",
                    self.rng.random_range(1..=10),
                    self.rng.random_range(0..=9),
                    self.rng.random_range(0..=9)
                )),
            }],
            protocols,
            cve_ids,
            description: format!(
                "A {vuln_type} vulnerability exists in {vendor} {product}. Successful \
                 exploitation of this vulnerability could allow an attacker to {effect} on the \
                 affected device. The vulnerability affects {protocol_list} communication."
            ),
            mitigations: vec![
                format!("Update {product} to the latest firmware version"),
                "Minimize network exposure for all control system devices".to_string(),
                format!("Implement network segmentation to isolate {protocol_list} traffic"),
                "Use VPN for remote access to control system networks".to_string(),
                "Monitor network traffic for anomalous activity".to_string(),
            ],
            source: ["ICS-CERT", "vendor", "CISA"]
                .choose(&mut self.rng)
                .copied()
                .unwrap_or("ICS-CERT")
                .to_string(),
        }
    }

    fn threat_report(&mut self, seq: usize) -> ThreatReport {
        let actor = THREAT_ACTORS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(THREAT_ACTORS[0]);
        let category = *ThreatCategory::ALL
            .choose(&mut self.rng)
            .unwrap_or(&ThreatCategory::Apt);
        let sector = SECTORS.choose(&mut self.rng).copied().unwrap_or(SECTORS[0]);
        let targets = self.pick_asset_types(1, 3);
        let protocols = self.pick_protocols(1, 3);
        let published = self.random_date();

        let technique_count = self.rng.random_range(2..=5);
        let techniques: Vec<(&str, &str)> = ATTACK_TECHNIQUES
            .choose_multiple(&mut self.rng, technique_count)
            .copied()
            .collect();
        let ttps: Vec<String> = techniques.iter().map(|(id, _)| (*id).to_string()).collect();
        let technique_names = techniques
            .iter()
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(", ");

        let target_list = targets
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let protocol_list = join_protocols(&protocols);

        ThreatReport {
            id: format!("TR-{}-{seq:03}", published.year()),
            title: format!("{actor} activity targeting {sector} sector {target_list} assets"),
            published,
            threat_category: category,
            actor: Some(actor.to_string()),
            targets,
            protocols,
            ttps,
            summary: format!(
                "{actor} has been observed conducting {} operations against {sector} sector \
                 organizations.",
                category.as_str()
            ),
            content: format!(
                "Analysis of recent intrusions attributes the activity to {actor}. The adversary \
                 leveraged {technique_names} against {target_list} assets communicating over \
                 {protocol_list}. Defenders should review detections for the listed techniques \
                 and audit remote access paths into the control network."
            ),
            iocs: Vec::new(),
        }
    }

    fn incident(&mut self, seq: usize) -> Incident {
        let sector = SECTORS.choose(&mut self.rng).copied().unwrap_or(SECTORS[0]);
        let asset_types = self.pick_asset_types(1, 3);
        let protocols = self.pick_protocols(1, 2);
        let reported = self.random_date();
        let asset_list = asset_types
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Incident {
            id: format!("INC-{}-{seq:03}", reported.year()),
            reported,
            sector: sector.to_string(),
            asset_types,
            protocols: protocols.clone(),
            description: format!(
                "Operators detected anomalous {} traffic directed at {asset_list} devices. \
                 Engineering review confirmed unauthorized command messages.",
                join_protocols(&protocols)
            ),
            impact: "Temporary loss of view; no loss of control reported.".to_string(),
            related_advisory_ids: Vec::new(),
        }
    }

    fn pick_protocols(&mut self, min: usize, max: usize) -> Vec<Protocol> {
        let k = self.rng.random_range(min..=max);
        Protocol::ALL
            .choose_multiple(&mut self.rng, k)
            .copied()
            .collect()
    }

    fn pick_asset_types(&mut self, min: usize, max: usize) -> Vec<AssetType> {
        let k = self.rng.random_range(min..=max);
        AssetType::ALL
            .choose_multiple(&mut self.rng, k)
            .copied()
            .collect()
    }

    fn random_date(&mut self) -> DateTime<Utc> {
        let start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).single();
        let days = self.rng.random_range(0..1095);
        match start {
            Some(start) => start + Duration::days(days),
            None => Utc::now(),
        }
    }
}

fn join_protocols(protocols: &[Protocol]) -> String {
    protocols
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn title_case(phrase: &str) -> String {
    phrase
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deterministic_per_seed() {
        let mut a = SyntheticCorpus::new(42);
        let mut b = SyntheticCorpus::new(42);
        let advisories_a = a.advisories(5);
        let advisories_b = b.advisories(5);
        for (x, y) in advisories_a.iter().zip(&advisories_b) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.title, y.title);
            assert_eq!(x.published, y.published);
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = SyntheticCorpus::new(1);
        let mut b = SyntheticCorpus::new(2);
        let titles_a: Vec<String> = a.advisories(10).into_iter().map(|adv| adv.title).collect();
        let titles_b: Vec<String> = b.advisories(10).into_iter().map(|adv| adv.title).collect();
        assert_ne!(titles_a, titles_b);
    }

    #[test]
    fn test_generated_shapes() {
        let mut corpus = SyntheticCorpus::new(7);

        for advisory in corpus.advisories(20) {
            assert!(advisory.id.starts_with("ICSA-"));
            assert!(!advisory.protocols.is_empty() && advisory.protocols.len() <= 3);
            assert!(!advisory.cve_ids.is_empty());
            assert!(!advisory.mitigations.is_empty());
        }

        for report in corpus.threat_reports(20) {
            assert!(report.id.starts_with("TR-"));
            assert!(report.actor.is_some());
            assert!((2..=5).contains(&report.ttps.len()));
        }

        for incident in corpus.incidents(20) {
            assert!(incident.id.starts_with("INC-"));
            assert!(!incident.asset_types.is_empty());
        }
    }
}
