//! Extraction driver. Walks all payloads of a source, decodes every
//! stream record and accumulates the samples per FourCC.
//!
//! Failures are contained at the smallest possible level:
//! a bad record skips that record, a bad payload skips that payload.
//! Only a source without payloads, or failing to assemble
//! the final result aborts the extraction.

use crate::gpmf::{Decode, KlvDecoder, Levels, RecordCursor, Stream};
use crate::source::PayloadSource;
use crate::{FourCC, GpmfError};

use super::assemble::assemble;
use super::registry::StreamRegistry;
use super::{ExtractEvent, ExtractOptions, Observer};

/// Reusable buffers for one extraction.
#[derive(Debug, Default)]
struct Scratch {
    payload: Vec<u8>,
    values: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Extractor<D: Decode = KlvDecoder> {
    decoder: D,
    options: ExtractOptions,
}

impl Extractor<KlvDecoder> {
    pub fn new(options: ExtractOptions) -> Self {
        Self::with_decoder(KlvDecoder, options)
    }
}

impl<D: Decode> Extractor<D> {
    pub fn with_decoder(decoder: D, options: ExtractOptions) -> Self {
        Self { decoder, options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Extract all streams in `source`, in order of first appearance.
    pub fn extract<S, O>(&self, source: &mut S, observer: &mut O) -> Result<Vec<Stream>, GpmfError>
    where
        S: PayloadSource + ?Sized,
        O: Observer + ?Sized,
    {
        let count = source.payload_count();
        if count == 0 {
            return Err(GpmfError::NoPayloads);
        }

        let mut registry = StreamRegistry::new(&self.options);
        let mut scratch = Scratch::default();

        for index in 0..count {
            if let Err(err) = self.extract_payload(source, index, &mut scratch, &mut registry, observer) {
                observer.notify(&ExtractEvent::PayloadSkipped { index, reason: &err });
            }
        }

        observer.notify(&ExtractEvent::Finished { payloads: count, streams: registry.len() });

        assemble(registry)
    }

    fn extract_payload<S, O>(
        &self,
        source: &mut S,
        index: usize,
        scratch: &mut Scratch,
        registry: &mut StreamRegistry,
        observer: &mut O,
    ) -> Result<(), GpmfError>
    where
        S: PayloadSource + ?Sized,
        O: Observer + ?Sized,
    {
        let size = source.payload_size(index);
        if size == 0 {
            return Err(GpmfError::EmptyPayload(index));
        }
        if size > self.options.max_payload_size {
            return Err(GpmfError::SafetyBound {
                what: "payload size",
                got: size,
                max: self.options.max_payload_size,
            });
        }

        let payload = source.payload(&mut scratch.payload, index)?;
        let mut cursor = self.decoder.init(payload)?;

        cursor.reset();
        while cursor.find_next(FourCC::STRM, Levels::Recurse).is_ok() {
            let mut record = cursor.clone();
            if record.seek_to_samples().is_err() {
                // metadata only
                continue;
            }
            let fourcc = record.key();
            if fourcc.is_invalid() {
                continue;
            }
            if let Err(err) = self.extract_record(&record, fourcc, &mut scratch.values, registry, observer) {
                observer.notify(&ExtractEvent::RecordSkipped { index, fourcc, reason: &err });
            }
        }

        Ok(())
    }

    fn extract_record<C, O>(
        &self,
        record: &C,
        fourcc: FourCC,
        values: &mut Vec<f64>,
        registry: &mut StreamRegistry,
        observer: &mut O,
    ) -> Result<(), GpmfError>
    where
        C: RecordCursor,
        O: Observer + ?Sized,
    {
        let known = registry.contains(&fourcc);
        let Some(accumulator) = registry.find_or_create(fourcc)? else {
            observer.notify(&ExtractEvent::StreamDropped { fourcc });
            return Ok(());
        };
        if !known {
            observer.notify(&ExtractEvent::StreamCreated {
                fourcc,
                sample_rate: accumulator.sample_rate(),
            });
        }

        let samples = record.sample_count();
        let elements = record.elements_per_sample();
        if elements == 0 || elements > self.options.max_elements {
            return Err(GpmfError::SafetyBound {
                what: "elements per sample",
                got: elements as u64,
                max: self.options.max_elements as u64,
            });
        }
        if samples == 0 {
            return Ok(());
        }

        let needed = samples * elements;
        values.clear();
        values.try_reserve(needed)?;
        values.resize(needed, 0.0);
        record.scaled_values(values, 0, samples)?;

        accumulator.append(values, samples, elements, self.options.growth_slack)
    }
}
