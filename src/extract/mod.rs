//! Stream extraction: payloads in, per-type sample streams out.

mod assemble;
mod driver;
mod observer;
mod options;
mod registry;

pub use driver::Extractor;
pub use observer::{ExtractEvent, LogObserver, NoopObserver, Observer};
pub use options::{ExtractOptions, SampleRates};
