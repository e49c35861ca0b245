mod common;

use common::*;
use gpmf_telemetry::source::MemorySource;
use gpmf_telemetry::{
    release,
    ExtractOptions,
    Extractor,
    FailureKind,
    FourCC,
    Gpmf,
    GpmfError,
    NoopObserver,
};

fn extract(payloads: Vec<Vec<u8>>, options: ExtractOptions, recorder: &mut Recorder) -> Result<Gpmf, GpmfError> {
    let mut source = MemorySource::new(payloads);
    Gpmf::from_source(&mut source, &options, recorder)
}

#[test]
fn zero_payloads_is_empty_input() {
    let mut recorder = Recorder::default();
    let err = extract(Vec::new(), ExtractOptions::default(), &mut recorder).unwrap_err();
    assert!(matches!(err, GpmfError::NoPayloads));
    assert_eq!(err.kind(), FailureKind::EmptyInput);
    assert!(err.is_fatal());
    assert_eq!(recorder.finished, 0);
}

#[test]
fn gps5_single_payload() {
    let mut recorder = Recorder::default();
    let gpmf = extract(vec![gps5_payload(0, 18)], ExtractOptions::default(), &mut recorder).unwrap();

    assert_eq!(gpmf.len(), 1);
    let gps = gpmf.find(&FourCC::GPS5).unwrap();
    assert_eq!(gps.len(), 18);
    assert_eq!(gps.elements_per_sample(), 5);
    assert_eq!(gps.sample_rate(), 18.0);

    for (i, sample) in gps.iter().enumerate() {
        assert_eq!(sample.fourcc(), FourCC::GPS5);
        assert_eq!(sample.timestamp(), i as f64 / 18.0);
        assert!((sample.values()[0] - latitude(0, i)).abs() < 1e-7);
        assert_eq!(&sample.values()[1..], &[13.0, 80.0, 1.5, 1.6]);
    }

    assert_eq!(recorder.created, vec![FourCC::GPS5]);
    assert_eq!(gpmf.device.as_deref(), Some("HERO9 Black"));
    assert_eq!(gpmf.device_name(), Some(gpmf_telemetry::DeviceName::Hero9Black));
    assert_eq!(gpmf.gps5().len(), 18);
}

#[test]
fn batches_beyond_initial_capacity() {
    let payloads = vec![
        devc(None, &[imu_strm(b"ACCL", 1500)]),
        devc(None, &[imu_strm(b"ACCL", 1500)]),
    ];
    let options = ExtractOptions::default().with_initial_capacity(1000);
    let gpmf = extract(payloads, options, &mut Recorder::default()).unwrap();

    let accl = gpmf.find(&FourCC::ACCL).unwrap();
    assert_eq!(accl.len(), 3000);
    assert_eq!(accl.sample_rate(), 200.0);
    assert_eq!(accl.samples()[2999].timestamp(), 2999.0 / 200.0);
    // second payload, sample 1234 of the stream
    assert_eq!(accl.samples()[1500 + 1234].values(), &[3.4, 3.41, 3.42]);
}

#[test]
fn deterministic() {
    let payloads: Vec<Vec<u8>> = (0..4)
        .map(|p| devc(Some("HERO9 Black"), &[gps5_strm(p, 18), imu_strm(b"GYRO", 200), imu_strm(b"ACCL", 200)]))
        .collect();
    let first = extract(payloads.clone(), ExtractOptions::default(), &mut Recorder::default()).unwrap();
    let second = extract(payloads, ExtractOptions::default(), &mut Recorder::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.types(), vec![FourCC::GPS5, FourCC::GYRO, FourCC::ACCL]);
}

#[test]
fn types_beyond_cap_dropped() {
    let streams: Vec<Vec<u8>> = (0..61)
        .map(|i| {
            let key = format!("T{i:03}");
            let key: [u8; 4] = key.as_bytes().try_into().unwrap();
            bytes_strm(&key, 2)
        })
        .collect();
    let mut recorder = Recorder::default();
    let gpmf = extract(vec![devc(None, &streams)], ExtractOptions::default(), &mut recorder).unwrap();

    assert_eq!(gpmf.len(), 60);
    assert_eq!(gpmf.first().unwrap().fourcc(), FourCC::from_str("T000"));
    assert_eq!(gpmf.last().unwrap().fourcc(), FourCC::from_str("T059"));
    assert!(gpmf.find(&FourCC::from_str("T060")).is_none());
    assert_eq!(recorder.dropped, vec![FourCC::from_str("T060")]);
    assert!(gpmf.iter().all(|s| s.len() == 1 && s.samples()[0].values() == [0.0, 1.0]));
}

#[test]
fn bad_payload_isolated() {
    let mut payloads: Vec<Vec<u8>> = (0..10).map(|p| gps5_payload(p, 18)).collect();
    payloads[2] = b"garbage!garbage!".to_vec();

    let mut recorder = Recorder::default();
    let gpmf = extract(payloads, ExtractOptions::default(), &mut recorder).unwrap();

    assert_eq!(recorder.skipped_payloads, vec![2]);
    let gps = gpmf.find(&FourCC::GPS5).unwrap();
    assert_eq!(gps.len(), 9 * 18);
    // payload 3 follows payload 1 directly
    assert!((gps.samples()[2 * 18].values()[0] - latitude(3, 0)).abs() < 1e-7);
    assert_eq!(gps.samples()[2 * 18].timestamp(), 36.0 / 18.0);
}

#[test]
fn empty_and_oversized_payloads_skipped() {
    let mut recorder = Recorder::default();
    let gpmf = extract(vec![Vec::new(), gps5_payload(0, 18)], ExtractOptions::default(), &mut recorder).unwrap();
    assert_eq!(recorder.skipped_payloads, vec![0]);
    assert_eq!(gpmf.find(&FourCC::GPS5).unwrap().len(), 18);

    let mut recorder = Recorder::default();
    let options = ExtractOptions::default().with_max_payload_size(64);
    let gpmf = extract(vec![gps5_payload(0, 18)], options, &mut recorder).unwrap();
    assert_eq!(recorder.skipped_payloads, vec![0]);
    assert!(gpmf.is_empty());
}

#[test]
fn element_bounds() {
    let payload = devc(None, &[
        bytes_strm(b"HUGE", 65),
        bytes_strm(b"WIDE", 20),
        imu_strm(b"GYRO", 10),
    ]);
    let mut recorder = Recorder::default();
    let gpmf = extract(vec![payload], ExtractOptions::default(), &mut recorder).unwrap();

    assert_eq!(recorder.skipped_records, vec![(0, FourCC::from_str("HUGE"))]);
    assert!(gpmf.find(&FourCC::from_str("HUGE")).is_none());

    let wide = gpmf.find(&FourCC::from_str("WIDE")).unwrap();
    assert_eq!(wide.elements_per_sample(), 20);
    assert_eq!(wide.captured_elements(), 16);
    assert_eq!(wide.samples()[0].values().len(), 16);
    assert_eq!(wide.samples()[0].get(15), Some(15.0));

    assert_eq!(gpmf.find(&FourCC::GYRO).unwrap().len(), 10);
}

#[test]
fn rate_override() {
    let options = ExtractOptions::default().with_rate(FourCC::GPS5, 10.0);
    let gpmf = extract(vec![gps5_payload(0, 10)], options, &mut Recorder::default()).unwrap();
    let gps = gpmf.find(&FourCC::GPS5).unwrap();
    assert_eq!(gps.sample_rate(), 10.0);
    assert_eq!(gps.samples()[9].timestamp(), 0.9);
    assert_eq!(gps.duration(), time::Duration::seconds(1));
}

#[test]
fn device_name_only_in_leading_payloads() {
    let mut payloads: Vec<Vec<u8>> = (0..6)
        .map(|p| devc(None, &[gps5_strm(p, 1)]))
        .collect();
    payloads.push(gps5_payload(6, 1));

    let gpmf = extract(payloads, ExtractOptions::default(), &mut Recorder::default()).unwrap();
    assert_eq!(gpmf.device, None);
    assert_eq!(gpmf.find(&FourCC::GPS5).unwrap().len(), 7);
}

#[test]
fn extractor_with_noop_observer() {
    let mut source = MemorySource::new(vec![gps5_payload(0, 18)]);
    let streams = Extractor::new(ExtractOptions::default())
        .extract(&mut source, &mut NoopObserver)
        .unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].fourcc(), FourCC::GPS5);
}

#[test]
fn from_slice_splits_devc() {
    let data = [gps5_payload(0, 18), gps5_payload(1, 18)].concat();
    let gpmf = Gpmf::from_slice(&data).unwrap();
    assert_eq!(gpmf.find(&FourCC::GPS5).unwrap().len(), 36);
    release(gpmf);
}

#[test]
fn oversized_type_array_skips_record() {
    let payload = devc(None, &[
        nest(b"STRM", &[
            klv(b"TYPE", b'c', 1, 15, b"B[100000000000]"),
            klv(b"FACE", b'?', 4, 1, &[1, 2, 3, 4]),
        ]),
        imu_strm(b"ACCL", 20),
    ]);
    let mut recorder = Recorder::default();
    let gpmf = extract(vec![payload, gps5_payload(1, 18)], ExtractOptions::default(), &mut recorder).unwrap();

    assert_eq!(recorder.skipped_records, vec![(0, FourCC(*b"FACE"))]);
    assert!(recorder.skipped_payloads.is_empty());
    assert!(gpmf.find(&FourCC(*b"FACE")).is_none());
    assert_eq!(gpmf.find(&FourCC::ACCL).unwrap().len(), 20);
    assert_eq!(gpmf.find(&FourCC::GPS5).unwrap().len(), 18);
}

#[test]
fn failed_growth_discards_batch_only() {
    let options = ExtractOptions {
        growth_slack: usize::MAX,
        ..ExtractOptions::default().with_initial_capacity(10)
    };
    let payloads = vec![
        devc(None, &[imu_strm(b"ACCL", 5), gps5_strm(0, 5)]),
        devc(None, &[imu_strm(b"ACCL", 20)]),
        devc(None, &[imu_strm(b"ACCL", 5), gps5_strm(2, 5)]),
    ];
    let mut recorder = Recorder::default();
    let gpmf = extract(payloads, options, &mut recorder).unwrap();

    assert_eq!(recorder.skipped_records, vec![(1, FourCC::ACCL)]);
    assert_eq!(recorder.record_failures, vec![FailureKind::AllocationFailure]);
    assert!(recorder.skipped_payloads.is_empty());

    let accl = gpmf.find(&FourCC::ACCL).unwrap();
    assert_eq!(accl.len(), 10);
    assert_eq!(accl.samples()[5].timestamp(), 5.0 / 200.0);
    assert_eq!(accl.samples()[5].values(), &[0.0, 0.01, 0.02]);

    let gps = gpmf.find(&FourCC::GPS5).unwrap();
    assert_eq!(gps.len(), 10);
    assert!((gps.samples()[5].values()[0] - latitude(2, 0)).abs() < 1e-7);
}
