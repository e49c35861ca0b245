use crate::GpmfError;

use super::PayloadSource;

/// Payloads already in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySource {
    payloads: Vec<Vec<u8>>,
}

impl MemorySource {
    pub fn new(payloads: Vec<Vec<u8>>) -> Self {
        Self { payloads }
    }

    /// A single payload.
    pub fn from_slice(slice: &[u8]) -> Self {
        Self { payloads: vec![slice.to_owned()] }
    }

    pub fn push(&mut self, payload: Vec<u8>) {
        self.payloads.push(payload)
    }
}

impl PayloadSource for MemorySource {
    fn payload_count(&self) -> usize {
        self.payloads.len()
    }

    fn payload_size(&self, index: usize) -> u64 {
        self.payloads.get(index)
            .map(|p| p.len() as u64)
            .unwrap_or(0)
    }

    fn payload<'s>(&'s mut self, _scratch: &'s mut Vec<u8>, index: usize) -> Result<&'s [u8], GpmfError> {
        let count = self.payloads.len();
        self.payloads.get(index)
            .map(|p| p.as_slice())
            .ok_or(GpmfError::PayloadOutOfRange { index, count })
    }
}
