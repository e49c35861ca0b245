//! Per-type sample accumulation during an extraction.

use crate::gpmf::{Sample, Stream};
use crate::{FourCC, GpmfError};

use super::ExtractOptions;

/// Growable sample buffer for one stream type.
#[derive(Debug)]
pub(crate) struct Accumulator {
    fourcc: FourCC,
    samples: Vec<Sample>,
    /// Set by the first decoded record, never changed after.
    elements_per_sample: Option<usize>,
    sample_rate: f64,
}

impl Accumulator {
    fn new(fourcc: FourCC, capacity: usize, sample_rate: f64) -> Result<Self, GpmfError> {
        let mut samples = Vec::new();
        samples.try_reserve_exact(capacity)?;
        Ok(Self {
            fourcc,
            samples,
            elements_per_sample: None,
            sample_rate,
        })
    }

    pub(crate) fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.samples.capacity()
    }

    /// Append `count` samples of `elements` values each from the
    /// interleaved, scaled `values`.
    ///
    /// If the buffer must grow it grows by `count + slack`. Should that
    /// fail, the whole batch is discarded and earlier samples are kept.
    pub(crate) fn append(
        &mut self,
        values: &[f64],
        count: usize,
        elements: usize,
        slack: usize,
    ) -> Result<(), GpmfError> {
        let needed = count * elements;
        if elements == 0 || values.len() < needed {
            return Err(GpmfError::BadStructure { offset: 0, reason: "sample batch shorter than declared" });
        }
        if self.samples.len() + count > self.samples.capacity() {
            self.samples.try_reserve_exact(count.saturating_add(slack))?;
        }
        self.elements_per_sample.get_or_insert(elements);

        let start = self.samples.len();
        let fourcc = self.fourcc;
        let rate = self.sample_rate;
        self.samples.extend(
            values[..needed].chunks_exact(elements)
                .enumerate()
                .map(|(i, chunk)| Sample::new(fourcc, (start + i) as f64 / rate, chunk))
        );
        Ok(())
    }

    pub(crate) fn into_stream(self) -> Stream {
        Stream {
            fourcc: self.fourcc,
            samples: self.samples,
            elements_per_sample: self.elements_per_sample.unwrap_or(0),
            sample_rate: self.sample_rate,
        }
    }
}

/// Bounded, insertion-ordered set of accumulators, keyed by FourCC.
#[derive(Debug)]
pub(crate) struct StreamRegistry<'o> {
    entries: Vec<Accumulator>,
    options: &'o ExtractOptions,
}

impl<'o> StreamRegistry<'o> {
    pub(crate) fn new(options: &'o ExtractOptions) -> Self {
        Self {
            entries: Vec::new(),
            options,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, fourcc: &FourCC) -> bool {
        self.entries.iter().any(|a| &a.fourcc == fourcc)
    }

    /// Accumulator for `fourcc`, created if absent.
    /// Returns `None` for a new type when the registry is full.
    pub(crate) fn find_or_create(&mut self, fourcc: FourCC) -> Result<Option<&mut Accumulator>, GpmfError> {
        if let Some(i) = self.entries.iter().position(|a| a.fourcc == fourcc) {
            return Ok(self.entries.get_mut(i));
        }
        if self.entries.len() >= self.options.max_stream_types {
            return Ok(None);
        }
        let accumulator = Accumulator::new(
            fourcc,
            self.options.initial_capacity,
            self.options.rates.estimate(&fourcc),
        )?;
        self.entries.push(accumulator);
        Ok(self.entries.last_mut())
    }

    pub(crate) fn into_accumulators(self) -> Vec<Accumulator> {
        self.entries
    }
}
