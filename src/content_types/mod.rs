//! Typed views over extracted streams.

pub mod gps;
pub mod sensor;
pub mod statistics;

use time::{format_description::well_known::Rfc3339, PrimitiveDateTime};

use crate::GpmfError;

pub use gps::{Gps, GoProPoint};
pub use statistics::Statistics;

/// Format as RFC3339, e.g. `2023-04-12T10:31:02.2Z`. GPS time is UTC.
pub(crate) fn primitivedatetime_to_string(datetime: &PrimitiveDateTime) -> Result<String, GpmfError> {
    Ok(datetime.assume_utc().format(&Rfc3339)?)
}
