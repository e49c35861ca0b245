//! Final assembly of accumulated streams.

use crate::gpmf::Stream;
use crate::GpmfError;

use super::registry::StreamRegistry;

/// Move all accumulators with samples into a contiguous list of streams,
/// in order of first appearance.
///
/// If the list itself can not be allocated every accumulated buffer is
/// dropped before the error is returned.
pub(crate) fn assemble(registry: StreamRegistry) -> Result<Vec<Stream>, GpmfError> {
    let accumulators = registry.into_accumulators();
    let count = accumulators.iter()
        .filter(|a| a.len() > 0)
        .count();

    let mut streams: Vec<Stream> = Vec::new();
    streams.try_reserve_exact(count)?;
    streams.extend(accumulators.into_iter()
        .filter(|a| a.len() > 0)
        .map(|a| a.into_stream()));

    Ok(streams)
}
