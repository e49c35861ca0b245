//! Builders for synthetic GPMF payloads and MP4 files.

#![allow(dead_code)]

use gpmf_telemetry::{ExtractEvent, FailureKind, FourCC, Observer};

/// Single KLV record, value padded to 32 bits.
pub fn klv(key: &[u8; 4], value_type: u8, struct_size: u8, repeat: u16, data: &[u8]) -> Vec<u8> {
    let mut out = key.to_vec();
    out.push(value_type);
    out.push(struct_size);
    out.extend(repeat.to_be_bytes());
    out.extend(data);
    while out.len() % 4 != 0 {
        out.push(0);
    }
    out
}

/// Nested KLV record.
pub fn nest(key: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = children.concat();
    let mut out = key.to_vec();
    out.extend([0, 4]);
    out.extend(((body.len() / 4) as u16).to_be_bytes());
    out.extend(body);
    out
}

/// `DEVC` with optional device name and the given `STRM`s.
pub fn devc(name: Option<&str>, streams: &[Vec<u8>]) -> Vec<u8> {
    let mut children = Vec::new();
    if let Some(name) = name {
        children.push(klv(b"DVNM", b'c', 1, name.len() as u16, name.as_bytes()));
    }
    children.extend(streams.iter().cloned());
    nest(b"DEVC", &children)
}

/// Latitude for GPS sample `i` of payload `payload`.
pub fn latitude(payload: usize, i: usize) -> f64 {
    55.0 + (payload * 100 + i) as f64 * 0.0001
}

/// `STRM` with `count` `GPS5` samples, scaled per element.
pub fn gps5_strm(payload: usize, count: usize) -> Vec<u8> {
    let mut scal = Vec::new();
    for s in [10_000_000_i32, 10_000_000, 1000, 1000, 100] {
        scal.extend(s.to_be_bytes());
    }
    let mut samples = Vec::new();
    for i in 0..count {
        let lat = (latitude(payload, i) * 1e7).round() as i32;
        for v in [lat, 130_000_000, 80_000, 1_500, 160] {
            samples.extend(v.to_be_bytes());
        }
    }
    nest(b"STRM", &[
        klv(b"STNM", b'c', 1, 10, b"GPS (Lat.)"),
        klv(b"GPSF", b'L', 4, 1, &3_u32.to_be_bytes()),
        klv(b"SCAL", b'l', 4, 5, &scal),
        klv(b"GPS5", b'l', 20, count as u16, &samples),
    ])
}

/// `STRM` with `count` 3-axis `i16` samples, scale 100.
pub fn imu_strm(key: &[u8; 4], count: usize) -> Vec<u8> {
    let mut samples = Vec::new();
    for i in 0..count {
        for axis in 0..3 {
            samples.extend(((i % 100) as i16 * 10 + axis).to_be_bytes());
        }
    }
    nest(b"STRM", &[
        klv(b"SCAL", b's', 2, 1, &100_i16.to_be_bytes()),
        klv(key, b's', 6, count as u16, &samples),
    ])
}

/// `STRM` with a single unscaled `u8` sample of `elements` values.
pub fn bytes_strm(key: &[u8; 4], elements: u8) -> Vec<u8> {
    let data: Vec<u8> = (0..elements).collect();
    nest(b"STRM", &[klv(key, b'B', elements, 1, &data)])
}

/// Payload with a device name and a `GPS5` stream of `count` samples.
pub fn gps5_payload(payload: usize, count: usize) -> Vec<u8> {
    devc(Some("HERO9 Black"), &[gps5_strm(payload, count)])
}

fn atom(name: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = ((body.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend(name);
    out.extend(body);
    out
}

fn full_atom(name: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut versioned = vec![0; 4];
    versioned.extend(body);
    atom(name, &versioned)
}

fn ftyp() -> Vec<u8> {
    atom(b"ftyp", b"mp41\0\0\0\0mp41isom")
}

/// MP4 file with `payloads` in `mdat`, described by a `GoPro MET` track.
/// Payloads are stored two per chunk.
pub fn mp4(payloads: &[Vec<u8>]) -> Vec<u8> {
    let ftyp = ftyp();
    let mdat = atom(b"mdat", &payloads.concat());

    let mut stsz = 0_u32.to_be_bytes().to_vec();
    stsz.extend((payloads.len() as u32).to_be_bytes());
    for p in payloads {
        stsz.extend((p.len() as u32).to_be_bytes());
    }

    let mut chunk_offsets = Vec::new();
    let mut pos = ftyp.len() + 8;
    for (i, p) in payloads.iter().enumerate() {
        if i % 2 == 0 {
            chunk_offsets.push(pos as u32);
        }
        pos += p.len();
    }
    let mut stco = (chunk_offsets.len() as u32).to_be_bytes().to_vec();
    for o in chunk_offsets.iter() {
        stco.extend(o.to_be_bytes());
    }

    let mut stsc = 1_u32.to_be_bytes().to_vec();
    for v in [1_u32, 2, 1] {
        stsc.extend(v.to_be_bytes());
    }

    let mut stsd = 1_u32.to_be_bytes().to_vec();
    stsd.extend(16_u32.to_be_bytes());
    stsd.extend(b"gpmd");
    stsd.extend([0, 0, 0, 0, 0, 0, 0, 1]);

    let mut hdlr = vec![0; 4];
    hdlr.extend(b"meta");
    hdlr.extend([0; 12]);
    hdlr.extend(b"\tGoPro MET\0");

    let stbl = atom(b"stbl", &[
        full_atom(b"stsd", &stsd),
        full_atom(b"stsz", &stsz),
        full_atom(b"stsc", &stsc),
        full_atom(b"stco", &stco),
    ].concat());
    let minf = atom(b"minf", &stbl);
    let mdia = atom(b"mdia", &[full_atom(b"hdlr", &hdlr), minf].concat());
    let trak = atom(b"trak", &mdia);
    let moov = atom(b"moov", &trak);

    [ftyp, mdat, moov].concat()
}

/// MP4 file without a GPMF track, with `gpmf` in `moov/udta/GPMF`.
pub fn mp4_udta(gpmf: &[u8]) -> Vec<u8> {
    let udta = atom(b"udta", &atom(b"GPMF", gpmf));
    let moov = atom(b"moov", &udta);
    [ftyp(), atom(b"mdat", &[]), moov].concat()
}

/// MP4 file without any telemetry.
pub fn mp4_plain() -> Vec<u8> {
    [ftyp(), atom(b"mdat", &[0; 16]), atom(b"moov", &atom(b"trak", &[]))].concat()
}

/// Observer recording the events of an extraction.
#[derive(Debug, Default)]
pub struct Recorder {
    pub created: Vec<FourCC>,
    pub dropped: Vec<FourCC>,
    pub skipped_payloads: Vec<usize>,
    pub skipped_records: Vec<(usize, FourCC)>,
    pub record_failures: Vec<FailureKind>,
    pub finished: usize,
}

impl Observer for Recorder {
    fn notify(&mut self, event: &ExtractEvent<'_>) {
        match event {
            ExtractEvent::StreamCreated { fourcc, .. } => self.created.push(*fourcc),
            ExtractEvent::StreamDropped { fourcc } => self.dropped.push(*fourcc),
            ExtractEvent::PayloadSkipped { index, .. } => self.skipped_payloads.push(*index),
            ExtractEvent::RecordSkipped { index, fourcc, reason } => {
                self.skipped_records.push((*index, *fourcc));
                self.record_failures.push(reason.kind());
            }
            ExtractEvent::Finished { .. } => self.finished += 1,
        }
    }
}
