//! Shipping schedule extraction.
//!
//! Turns OCR text from carrier schedule screenshots into
//! vessel / voyage / ETD / ETA records, resolving misread vessel names
//! against a tiered vessel database.

pub mod dates;
pub mod detect;
pub mod domain;
pub mod parsers;
pub mod pipeline;
pub mod vessels;
