//! Errors and their classification.

use std::{collections::TryReserveError, path::PathBuf};

use thiserror::Error;

use crate::FourCC;

/// How an error affects an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Payload source unavailable. Aborts the extraction.
    OpenFailure,
    /// Payload source reports zero payloads. Aborts the extraction.
    EmptyInput,
    /// Buffer growth or final assembly failed.
    AllocationFailure,
    /// One record or payload is malformed. Skipped.
    RecordDecodeFailure,
    /// Size or shape outside configured ceilings. Skipped.
    SafetyBoundExceeded,
}

#[derive(Debug, Error)]
pub enum GpmfError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to read binary data: {0}")]
    BinReadError(#[from] binrw::Error),
    #[error("Not a supported file type: {0}")]
    InvalidFileType(PathBuf),
    #[error("No GPMF track or user data GPMF in {0}")]
    NoGpmfTrack(PathBuf),
    #[error("Invalid MP4 structure: {0}")]
    InvalidMp4(String),
    #[error("File size {got} exceeds max size {max} for {path}")]
    MaxFileSizeExceeded {
        max: u64,
        got: u64,
        path: PathBuf,
    },
    #[error("No payloads in source")]
    NoPayloads,
    #[error("Payload {0} is empty")]
    EmptyPayload(usize),
    #[error("Payload index {index} out of range, {count} payloads")]
    PayloadOutOfRange { index: usize, count: usize },
    #[error("Allocation failed: {0}")]
    AllocationError(#[from] TryReserveError),
    #[error("Malformed GPMF at byte offset {offset}: {reason}")]
    BadStructure { offset: usize, reason: &'static str },
    #[error("Unsupported GPMF value type '{}'", *.0 as char)]
    UnsupportedType(u8),
    #[error("No record {0} found")]
    NoSuchRecord(FourCC),
    #[error("{what} is {got}, max {max}")]
    SafetyBound {
        what: &'static str,
        got: u64,
        max: u64,
    },
    #[error("Stream {0} holds no samples")]
    NoData(FourCC),
    #[error("Failed to format date time: {0}")]
    TimeFormatError(#[from] time::error::Format),
    #[error("Failed to write GeoJSON: {0}")]
    GeoJsonError(#[from] geojson::Error),
    #[error("Failed to write XML: {0}")]
    XmlError(#[from] quick_xml::Error),
}

impl GpmfError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::IoError(_)
            | Self::InvalidFileType(_)
            | Self::NoGpmfTrack(_)
            | Self::InvalidMp4(_)
            | Self::MaxFileSizeExceeded { .. } => FailureKind::OpenFailure,
            Self::NoPayloads => FailureKind::EmptyInput,
            Self::AllocationError(_) => FailureKind::AllocationFailure,
            Self::SafetyBound { .. } => FailureKind::SafetyBoundExceeded,
            Self::BinReadError(_)
            | Self::EmptyPayload(_)
            | Self::PayloadOutOfRange { .. }
            | Self::BadStructure { .. }
            | Self::UnsupportedType(_)
            | Self::NoSuchRecord(_)
            | Self::NoData(_)
            | Self::TimeFormatError(_)
            | Self::GeoJsonError(_)
            | Self::XmlError(_) => FailureKind::RecordDecodeFailure,
        }
    }

    /// Whether the error aborts a whole extraction.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), FailureKind::OpenFailure | FailureKind::EmptyInput)
    }
}
