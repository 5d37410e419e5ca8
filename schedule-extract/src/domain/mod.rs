//! Domain types for schedule extraction.
//!
//! Records are normalized at construction time, so code that receives a
//! `ScheduleRecord` can rely on the vessel name already being in canonical
//! spacing and on placeholders instead of empty strings.

mod carrier;
mod record;
mod vessel_name;

pub use carrier::Carrier;
pub use record::{NO_VOYAGE, ParseResult, ScheduleRecord, TBA};
pub use vessel_name::normalize_vessel_name;
