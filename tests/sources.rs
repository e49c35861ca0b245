mod common;

use std::fs;

use common::*;
use gpmf_telemetry::export::{csv_to_dir, write_geojson, write_gpx, write_kml};
use gpmf_telemetry::source::{self, Mp4Source, PayloadSource};
use gpmf_telemetry::{
    device_name,
    extract_all,
    has_telemetry,
    release,
    FailureKind,
    FourCC,
    Gpmf,
    SensorType,
};

#[test]
fn mp4_track() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GH010001.MP4");
    let payloads: Vec<Vec<u8>> = (0..3).map(|p| gps5_payload(p, 18)).collect();
    fs::write(&path, mp4(&payloads)).unwrap();

    let mut mp4 = Mp4Source::new(&path).unwrap();
    assert_eq!(mp4.payload_count(), 3);
    assert_eq!(mp4.payload_size(1), payloads[1].len() as u64);
    assert_eq!(mp4.payload_size(3), 0);
    let mut scratch = Vec::new();
    assert_eq!(mp4.payload(&mut scratch, 2).unwrap(), payloads[2].as_slice());

    assert!(has_telemetry(&path));
    assert_eq!(device_name(&path).as_deref(), Some("HERO9 Black"));

    let gpmf = Gpmf::new(&path).unwrap();
    assert_eq!(gpmf.source, vec![path.clone()]);
    let gps = gpmf.find(&FourCC::GPS5).unwrap();
    assert_eq!(gps.len(), 54);
    assert!((gps.samples()[18].values()[0] - latitude(1, 0)).abs() < 1e-7);
    assert_eq!(gps.samples()[53].timestamp(), 53.0 / 18.0);
}

#[test]
fn mp4_udta_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GH010002.MP4");
    fs::write(&path, mp4_udta(&gps5_payload(0, 18))).unwrap();

    let gpmf = extract_all(&path).unwrap();
    assert_eq!(gpmf.find(&FourCC::GPS5).unwrap().len(), 18);
    release(gpmf);
}

#[test]
fn mp4_without_telemetry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GH010003.MP4");
    fs::write(&path, mp4_plain()).unwrap();

    let err = Gpmf::new(&path).unwrap_err();
    assert_eq!(err.kind(), FailureKind::OpenFailure);
    assert!(!has_telemetry(&path));
    assert!(extract_all(&path).is_none());
    assert!(device_name(&path).is_none());
}

#[test]
fn missing_file() {
    let path = std::path::Path::new("/nonexistent/GH010004.MP4");
    assert!(!has_telemetry(path));
    assert!(extract_all(path).is_none());
    assert_eq!(Gpmf::new(path).unwrap_err().kind(), FailureKind::OpenFailure);
}

#[test]
fn raw_gpmf_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GH010005.gpmf");
    let data = [
        devc(Some("HERO9 Black"), &[gps5_strm(0, 18), imu_strm(b"ACCL", 200)]),
        devc(Some("HERO9 Black"), &[gps5_strm(1, 18), imu_strm(b"ACCL", 200)]),
    ].concat();
    fs::write(&path, data).unwrap();

    let mut raw = source::open(&path).unwrap();
    assert_eq!(raw.payload_count(), 2);

    let gpmf = Gpmf::new(&path).unwrap();
    assert_eq!(gpmf.types(), vec![FourCC::GPS5, FourCC::ACCL]);
    assert_eq!(gpmf.find(&FourCC::ACCL).unwrap().len(), 400);
    assert_eq!(gpmf.duration_ms(), 2000);

    let accl = gpmf.sensor(&SensorType::Accelerometer).unwrap();
    assert_eq!(accl.len(), 400);
    assert_eq!(accl.sample_rate, 200.0);
}

#[test]
fn export_files() {
    let dir = tempfile::tempdir().unwrap();
    let gpmf = Gpmf::from_slice(&gps5_payload(0, 18)).unwrap();

    let paths = csv_to_dir(&gpmf, dir.path(), "GH010006", 1).unwrap();
    assert_eq!(paths, vec![dir.path().join("GH010006_GPS5.csv")]);
    let csv = fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(csv.lines().count(), 19);
    assert_eq!(csv.lines().next(), Some("time,GPS5_0,GPS5_1,GPS5_2,GPS5_3,GPS5_4"));

    let geojson_path = dir.path().join("GH010006.geojson");
    write_geojson(&gpmf, &geojson_path, 6).unwrap();
    let geojson: geojson::GeoJson = fs::read_to_string(&geojson_path).unwrap().parse().unwrap();
    match geojson {
        geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 4),
        other => panic!("expected feature collection, got {other:?}"),
    }
}

#[test]
fn plain_file_has_no_telemetry() {
    let dir = tempfile::tempdir().unwrap();

    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "# Trip notes\nRode from Malmö to Lund.\n").unwrap();
    assert!(!has_telemetry(&notes));
    assert!(extract_all(&notes).is_none());
    assert_eq!(Gpmf::new(&notes).unwrap_err().kind(), FailureKind::EmptyInput);

    // printable first key, but not GPMF
    let text = dir.path().join("text.txt");
    fs::write(&text, "Some words that look like keys at first.\n").unwrap();
    assert!(!has_telemetry(&text));
    assert!(extract_all(&text).is_none());
}

#[test]
fn track_exports_and_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GH010007.gpmf");
    fs::write(&path, gps5_payload(0, 18)).unwrap();
    let gpmf = Gpmf::new(&path).unwrap();

    let gpx_path = dir.path().join("GH010007.gpx");
    write_gpx(&gpmf, &gpx_path, 1).unwrap();
    let gpx = fs::read_to_string(&gpx_path).unwrap();
    assert_eq!(gpx.matches("<trkpt ").count(), 18);
    assert!(gpx.contains("<name>GH010007</name>"));
    assert!(gpx.contains("<ele>80</ele>"));
    // GPS5 has no per-point time or fix
    assert!(!gpx.contains("<fix>"));

    let kml_path = dir.path().join("GH010007.kml");
    write_kml(&gpmf, &kml_path, 6).unwrap();
    let kml = fs::read_to_string(&kml_path).unwrap();
    assert!(kml.contains("<coordinates>13,55,80 "));
    assert_eq!(kml.matches(",80").count(), 3);

    let stats = gpmf.statistics();
    assert!((stats.distance - 17.0 * 11.1195).abs() < 0.5, "{}", stats.distance);
    assert_eq!(stats.max_speed, 1.5);
    assert_eq!(stats.avg_speed, 1.5);
    assert_eq!((stats.min_altitude, stats.max_altitude), (Some(80.0), Some(80.0)));
    assert_eq!(stats.max_acceleration, None);
    assert_eq!(stats.duration, time::Duration::seconds(1));
}
