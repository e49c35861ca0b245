//! Observability for extractions. Observers only watch:
//! nothing they do feeds back into the extraction.

use crate::{FourCC, GpmfError};

#[derive(Debug)]
pub enum ExtractEvent<'e> {
    /// A new stream type was registered.
    StreamCreated { fourcc: FourCC, sample_rate: f64 },
    /// A record of a new type was seen with the registry full.
    StreamDropped { fourcc: FourCC },
    /// A whole payload was skipped.
    PayloadSkipped { index: usize, reason: &'e GpmfError },
    /// A single stream record was skipped.
    RecordSkipped { index: usize, fourcc: FourCC, reason: &'e GpmfError },
    Finished { payloads: usize, streams: usize },
}

pub trait Observer {
    fn notify(&mut self, event: &ExtractEvent<'_>);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&mut self, event: &ExtractEvent<'_>) {
        match event {
            ExtractEvent::StreamCreated { fourcc, sample_rate } => {
                log::debug!("New stream {fourcc}, estimated {sample_rate} Hz")
            }
            ExtractEvent::StreamDropped { fourcc } => {
                log::debug!("Stream type limit reached, dropping {fourcc}")
            }
            ExtractEvent::PayloadSkipped { index, reason } => {
                log::warn!("Skipping payload {index}: {reason}")
            }
            ExtractEvent::RecordSkipped { index, fourcc, reason } => {
                log::debug!("Skipping {fourcc} in payload {index}: {reason}")
            }
            ExtractEvent::Finished { payloads, streams } => {
                log::debug!("Processed {payloads} payloads, {streams} stream types")
            }
        }
    }
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn notify(&mut self, _event: &ExtractEvent<'_>) {}
}

impl<F: FnMut(&ExtractEvent<'_>)> Observer for F {
    fn notify(&mut self, event: &ExtractEvent<'_>) {
        self(event)
    }
}
