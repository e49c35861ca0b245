//! GoPro device name (`DVNM`).

use std::fmt::Display;

use crate::gpmf::{Decode, Levels, RecordCursor};
use crate::source::PayloadSource;
use crate::{ExtractOptions, FourCC};

/// GoPro camera model, derived from the device name
/// logged in `DVNM`. Does not yet include all models.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum DeviceName {
    Hero5Black,  // DVNM "Camera"
    Hero6Black,
    Hero7Black,  // DVNM "Hero7 Black" or "HERO7 Black"
    Hero8Black,
    Hero9Black,
    Hero10Black,
    Hero11Black,
    Hero12Black,
    Fusion,
    GoProMax,
    GoProKarma,  // DVNM "GoPro Karma v1.0" + whichever device is connected
    #[default]
    Unknown,
}

impl Display for DeviceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl DeviceName {
    /// Model from the start of the firmware string, e.g. `HD8` for Hero8 Black.
    pub fn from_firmware_id(id: &str) -> Self {
        match id.get(..3) {
            Some("HD5") => Self::Hero5Black,
            Some("HD6") => Self::Hero6Black,
            Some("FS1") => Self::Fusion,
            Some("HD7") => Self::Hero7Black,
            Some("HD8") => Self::Hero8Black,
            Some("HD9") => Self::Hero9Black, // possibly H20
            Some("H19") => Self::GoProMax,
            Some("H20") => Self::Hero9Black,
            Some("H21") => Self::Hero10Black,
            Some("H22") => Self::Hero11Black,
            Some("H23") => Self::Hero12Black,
            _ => Self::Unknown
        }
    }

    pub fn from_str(model: &str) -> Self {
        match model.trim() {
            // Hero5 Black identifies itself as "Camera" so far.
            "Camera" | "Hero5 Black" | "HERO5 Black" => Self::Hero5Black,
            "Hero6 Black" | "HERO6 Black" => Self::Hero6Black,
            "Hero7 Black" | "HERO7 Black" => Self::Hero7Black,
            "Hero8 Black" | "HERO8 Black" => Self::Hero8Black,
            "Hero9 Black" | "HERO9 Black" => Self::Hero9Black,
            "Hero10 Black" | "HERO10 Black" => Self::Hero10Black,
            "Hero11 Black" | "HERO11 Black" => Self::Hero11Black,
            "Hero12 Black" | "HERO12 Black" => Self::Hero12Black,
            "Fusion" | "FUSION" => Self::Fusion,
            "GoPro Max" => Self::GoProMax,
            "GoPro Karma v1.0" => Self::GoProKarma,
            _ => Self::Unknown
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            Self::Hero5Black => "Hero5 Black",
            Self::Hero6Black => "Hero6 Black",
            Self::Hero7Black => "Hero7 Black",
            Self::Hero8Black => "Hero8 Black",
            Self::Hero9Black => "Hero9 Black",
            Self::Hero10Black => "Hero10 Black",
            Self::Hero11Black => "Hero11 Black",
            Self::Hero12Black => "Hero12 Black",
            Self::Fusion => "Fusion",
            Self::GoProMax => "GoPro Max",
            Self::GoProKarma => "GoPro Karma v1.0", // only v1.0 so far
            Self::Unknown => "Unknown",
        }
    }
}

/// Raw `DVNM` value from the first `DEVC` that has one,
/// searching the first `options.device_name_scan` payloads.
///
/// The Karma drone logs two devices, the drone and the attached camera.
/// Only the first one found is returned.
pub fn locate_device_name<S, D>(source: &mut S, decoder: &D, options: &ExtractOptions) -> Option<Vec<u8>>
where
    S: PayloadSource + ?Sized,
    D: Decode,
{
    let mut scratch = Vec::new();
    let scan = source.payload_count().min(options.device_name_scan);

    for index in 0..scan {
        let size = source.payload_size(index);
        if size == 0 || size > options.max_payload_size {
            continue;
        }
        let Ok(payload) = source.payload(&mut scratch, index) else {
            continue;
        };
        let Ok(mut cursor) = decoder.init(payload) else {
            continue;
        };
        while cursor.find_next(FourCC::DEVC, Levels::Recurse).is_ok() {
            // direct children of this DEVC only
            let mut devc = cursor.clone();
            if devc.enter().is_ok() && devc.find_next(FourCC::DVNM, Levels::Current).is_ok() {
                return Some(devc.raw_data().to_vec());
            }
        }
    }

    None
}

/// `DVNM` bytes as a string, NUL padding removed.
pub fn device_name_string(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_from_name() {
        assert_eq!(DeviceName::from_str("HERO9 Black"), DeviceName::Hero9Black);
        assert_eq!(DeviceName::from_str("Camera"), DeviceName::Hero5Black);
        assert_eq!(DeviceName::from_str("Insta360"), DeviceName::Unknown);
    }

    #[test]
    fn model_from_firmware() {
        assert_eq!(DeviceName::from_firmware_id("H22.01.01.10.70"), DeviceName::Hero11Black);
        assert_eq!(DeviceName::from_firmware_id("H2"), DeviceName::Unknown);
    }

    fn klv(key: &[u8; 4], value_type: u8, repeat: u16, data: &[u8]) -> Vec<u8> {
        let mut out = key.to_vec();
        out.extend([value_type, if value_type == 0 { 4 } else { 1 }]);
        out.extend(repeat.to_be_bytes());
        out.extend(data);
        while out.len() % 4 != 0 {
            out.push(0);
        }
        out
    }

    fn devc(children: &[Vec<u8>]) -> Vec<u8> {
        let body = children.concat();
        klv(b"DEVC", 0, (body.len() / 4) as u16, &body)
    }

    fn locate(payloads: Vec<Vec<u8>>) -> Option<String> {
        let mut source = crate::source::MemorySource::new(payloads);
        locate_device_name(&mut source, &crate::gpmf::KlvDecoder, &ExtractOptions::default())
            .map(|raw| device_name_string(&raw))
    }

    #[test]
    fn name_from_matched_devc() {
        let unnamed = devc(&[klv(b"DVID", b'c', 4, b"0001")]);
        let named = devc(&[klv(b"DVNM", b'c', 11, b"HERO9 Black")]);
        let stray = klv(b"DVNM", b'c', 5, b"Stray");

        // a DVNM outside any DEVC is not a device name
        assert_eq!(locate(vec![[unnamed.clone(), stray].concat()]), None);
        assert_eq!(locate(vec![[unnamed, named].concat()]).as_deref(), Some("HERO9 Black"));
    }

    #[test]
    fn padded_name() {
        assert_eq!(device_name_string(b"HERO11 Black\0\0\0"), "HERO11 Black");
    }
}
