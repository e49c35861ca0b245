/// `hdlr` atom handler name for the GPMF track.
pub const GOPRO_METADATA_HANDLER: &'static str = "GoPro MET";
/// Sample description format for the GPMF track (`stsd`).
pub const GOPRO_METADATA_FORMAT: &[u8; 4] = b"gpmd";
/// GPMF box in the MP4 user data atom (`udta`).
pub const GOPRO_UDTA_GPMF_FOURCC: &[u8; 4] = b"GPMF";

/// Payloads larger than this are treated as a corrupt length field.
pub const MAX_PAYLOAD_SIZE: u64 = 10_000_000;
/// Max in-memory size for "raw" GPMF files (50MB).
pub const MAX_RAW_FILE_SIZE: u64 = 50_000_000;
/// Max number of distinct stream types per extraction.
pub const MAX_STREAM_TYPES: usize = 60;
/// Initial sample capacity for a newly discovered stream type.
pub const INITIAL_CAPACITY: usize = 1000;
/// Extra samples reserved on top of an incoming batch when growing.
pub const GROWTH_SLACK: usize = 2000;
/// Structural upper bound for elements per sample.
pub const MAX_ELEMENTS: usize = 64;
/// Elements kept per sample. Anything beyond is truncated.
pub const MAX_CAPTURED_ELEMENTS: usize = 16;
/// Number of leading payloads searched for `DVNM`.
pub const DEVICE_NAME_SCAN: usize = 5;
/// Slowest accepted sample rate override, one sample per 1000 s.
pub const MIN_SAMPLE_RATE: f64 = 0.001;
/// Max KLV nesting depth accepted by the decoder.
pub const MAX_NEST_DEPTH: usize = 8;
