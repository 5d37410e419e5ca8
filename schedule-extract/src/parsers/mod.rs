//! Carrier-specific schedule parsers.
//!
//! Each carrier lays its schedule table out differently. A parser recognises
//! one layout and turns OCR lines into [`ScheduleRecord`]s; the
//! [`ParserRegistry`] picks which parser runs. Parsers never fail: text they
//! cannot read simply yields no records.

mod cma;
mod generic;
mod maersk;
mod oocl;
mod patterns;


use tracing::debug;

use crate::dates::reconcile;
use crate::domain::{Carrier, ScheduleRecord, normalize_vessel_name};
use crate::vessels::VesselResolver;

pub use cma::CmaParser;
pub use generic::GenericParser;
pub use maersk::MaerskParser;
pub use oocl::OoclParser;

/// A strategy for one schedule layout.
pub trait ScheduleParser {
    /// Name matched against carrier hints.
    fn name(&self) -> &'static str;

    /// Carrier stamped on the records this parser produces.
    fn carrier(&self) -> Option<Carrier>;

    /// Whether the joined text looks like this parser's layout.
    fn can_parse(&self, text: &str) -> bool;

    /// Extract records in order of appearance.
    fn parse(&self, lines: &[String], resolver: &VesselResolver) -> Vec<ScheduleRecord>;

    /// Clean a raw vessel name and resolve it to its canonical form.
    fn normalize_vessel(&self, raw: &str, resolver: &VesselResolver) -> String {
        let name = normalize_vessel_name(raw);
        if name.is_empty() {
            return name;
        }
        resolver.match_vessel(&name).name
    }
}

/// The closed set of parsers.
#[derive(Debug, Clone, Copy)]
pub enum CarrierParser {
    Maersk(MaerskParser),
    CmaCgm(CmaParser),
    Oocl(OoclParser),
    Generic(GenericParser),
}

impl CarrierParser {
    fn inner(&self) -> &dyn ScheduleParser {
        match self {
            CarrierParser::Maersk(p) => p,
            CarrierParser::CmaCgm(p) => p,
            CarrierParser::Oocl(p) => p,
            CarrierParser::Generic(p) => p,
        }
    }

    /// Whether a carrier hint selects this parser.
    ///
    /// Case-insensitive: the hint equals the name, contains it, or is
    /// contained in it.
    fn matches_hint(&self, hint: &str) -> bool {
        let name = self.name().to_uppercase();
        let hint = hint.trim().to_uppercase();
        !hint.is_empty() && (hint == name || hint.contains(&name) || name.contains(&hint))
    }
}

impl ScheduleParser for CarrierParser {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn carrier(&self) -> Option<Carrier> {
        self.inner().carrier()
    }

    fn can_parse(&self, text: &str) -> bool {
        self.inner().can_parse(text)
    }

    fn parse(&self, lines: &[String], resolver: &VesselResolver) -> Vec<ScheduleRecord> {
        self.inner().parse(lines, resolver)
    }
}

/// Parsers in dispatch order. The generic parser accepts anything and is last.
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    parsers: [CarrierParser; 4],
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: [
                CarrierParser::Maersk(MaerskParser),
                CarrierParser::CmaCgm(CmaParser),
                CarrierParser::Oocl(OoclParser),
                CarrierParser::Generic(GenericParser),
            ],
        }
    }

    pub fn parsers(&self) -> &[CarrierParser] {
        &self.parsers
    }

    /// The first parser selected by `hint`.
    pub fn for_hint(&self, hint: &str) -> Option<&CarrierParser> {
        self.parsers.iter().find(|p| p.matches_hint(hint))
    }

    /// Parse `lines` into schedule records.
    ///
    /// A hinted parser runs first. If there is no hint, no parser for it, or
    /// it finds nothing, parsers are tried in order and the first one that
    /// accepts the text and produces records wins. Every record then has its
    /// dates put in order.
    pub fn parse_schedules(
        &self,
        lines: &[String],
        hint: Option<&str>,
        resolver: &VesselResolver,
    ) -> Vec<ScheduleRecord> {
        if lines.iter().all(|l| l.trim().is_empty()) {
            return Vec::new();
        }

        let mut records = self.run(lines, hint, resolver);
        for record in &mut records {
            if reconcile(record) {
                debug!(vessel = %record.vessel, voyage = %record.voyage, "Swapped reversed ETD/ETA");
            }
        }
        records
    }

    fn run(
        &self,
        lines: &[String],
        hint: Option<&str>,
        resolver: &VesselResolver,
    ) -> Vec<ScheduleRecord> {
        if let Some(parser) = hint.and_then(|h| self.for_hint(h)) {
            let records = parser.parse(lines, resolver);
            if !records.is_empty() {
                debug!(parser = parser.name(), records = records.len(), "Hinted parser matched");
                return records;
            }
            debug!(parser = parser.name(), "Hinted parser found nothing");
        }

        let text = lines.join("\n");
        for parser in &self.parsers {
            if !parser.can_parse(&text) {
                continue;
            }
            let records = parser.parse(lines, resolver);
            if !records.is_empty() {
                debug!(parser = parser.name(), records = records.len(), "Parser matched");
                return records;
            }
        }

        debug!(lines = lines.len(), "No parser produced schedules");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_fixed() {
        let names: Vec<_> = ParserRegistry::new().parsers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["MAERSK", "CMA-CGM", "OOCL", "GENERIC"]);
    }

    #[test]
    fn hint_matching() {
        let registry = ParserRegistry::new();
        assert_eq!(registry.for_hint("MAERSK").map(|p| p.name()), Some("MAERSK"));
        assert_eq!(registry.for_hint("maersk line").map(|p| p.name()), Some("MAERSK"));
        assert_eq!(registry.for_hint("cma").map(|p| p.name()), Some("CMA-CGM"));
        assert_eq!(registry.for_hint("OOCL").map(|p| p.name()), Some("OOCL"));
        assert!(registry.for_hint("HAPAG-LLOYD").is_none());
        assert!(registry.for_hint("   ").is_none());
    }

    #[test]
    fn parsers_report_carriers() {
        let registry = ParserRegistry::new();
        let carriers: Vec<_> = registry.parsers().iter().map(|p| p.carrier()).collect();
        assert_eq!(
            carriers,
            vec![Some(Carrier::Maersk), Some(Carrier::CmaCgm), Some(Carrier::Oocl), None]
        );
    }
}
