//! Document-level extraction: carrier detection, parsing, and a summary.

use tracing::{debug, info};

use crate::detect;
use crate::domain::{Carrier, ParseResult};
use crate::parsers::ParserRegistry;
use crate::vessels::VesselResolver;

/// One document to extract schedules from.
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    /// OCR text, one entry per line.
    pub lines: Vec<String>,
    /// Screenshot filename, used for prefix-based carrier detection.
    pub filename: Option<String>,
    /// Carrier hint. Overrides detection when set.
    pub hint: Option<String>,
}

impl ExtractRequest {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// Build a request from raw bytes, replacing invalid UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(lines_from_bytes(bytes))
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Split arbitrary bytes into lines, replacing invalid UTF-8.
pub fn lines_from_bytes(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// Extract schedules from one document.
///
/// The parser hint is the explicit hint if given, else the carrier from the
/// filename prefix, else the carrier guessed from the text.
pub fn extract(request: &ExtractRequest, resolver: &VesselResolver) -> ParseResult {
    let mut result = ParseResult {
        source_file: request.filename.clone(),
        raw_text: request.lines.clone(),
        ..ParseResult::default()
    };

    let hint = request
        .hint
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty());

    let detected = match hint {
        Some(_) => None,
        None => request
            .filename
            .as_deref()
            .and_then(detect::by_filename)
            .or_else(|| detect::by_content(&request.lines.join("\n"))),
    };
    if let Some(carrier) = detected {
        debug!(carrier = %carrier, "Detected carrier");
    }

    let parser_hint = hint.or_else(|| detected.map(|c| c.as_str()));
    result.schedules =
        ParserRegistry::new().parse_schedules(&request.lines, parser_hint, resolver);

    result.carrier = hint
        .and_then(Carrier::parse)
        .or(detected)
        .or_else(|| result.schedules.iter().find_map(|s| s.carrier));

    if result.carrier.is_none() {
        result.errors.push("no carrier matched".to_string());
    }
    if result.schedules.is_empty() {
        result.errors.push("no schedules found".to_string());
    } else {
        let valid = result.valid_schedules().len();
        result.confidence = valid as f64 / result.schedules.len() as f64;
    }

    info!(
        file = request.filename.as_deref().unwrap_or("-"),
        carrier = result.carrier.map(|c| c.as_str()).unwrap_or("-"),
        schedules = result.schedules.len(),
        "Extracted schedules"
    );

    result
}
