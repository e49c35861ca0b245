//! GPMF core: KLV structure, decoding, and the extracted streams.

pub mod decoder;
pub mod fourcc;
pub mod gpmf;
pub mod klv;
pub mod stream;
pub mod timestamp;

pub use decoder::{Decode, KlvCursor, KlvDecoder, Levels, RecordCursor};
pub use fourcc::{FourCC, StreamFamily};
pub use gpmf::Gpmf;
pub use klv::{KlvHeader, ValueType};
pub use stream::{Sample, Stream};
pub use timestamp::Timestamp;
