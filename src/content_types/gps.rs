//! GPS points from `GPS5` (Hero10 and earlier) and `GPS9` (Hero11 and later).

use time::{ext::NumericalDuration, macros::datetime, PrimitiveDateTime};

use crate::{FourCC, GpmfError, Sample, Stream, Timestamp};

use super::primitivedatetime_to_string;

/// GPS start date for `GPS9` day counts.
const GPS9_EPOCH: PrimitiveDateTime = datetime!(2000-01-01 0:00);

/// Point derived from a single `GPS5` or `GPS9` sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoProPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude (m).
    pub altitude: f64,
    /// 2D speed (m/s).
    pub speed2d: f64,
    /// 3D speed (m/s).
    pub speed3d: f64,
    /// UTC date time. `GPS9` only, since `GPS5` logs time
    /// once per cluster as a string (`GPSU`).
    pub datetime: Option<PrimitiveDateTime>,
    /// Dilution of precision. `GPS9` only.
    /// A value below 5 is good.
    pub dop: Option<f64>,
    /// Satellite lock, 0 (none), 2 (2D), 3 (3D). `GPS9` only.
    pub fix: Option<u32>,
    /// Estimated time relative to the first point.
    pub time: Timestamp,
}

impl std::fmt::Display for GoProPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\
            latitude:  {}
            longitude: {}
            altitude:  {}
            speed2d:   {}
            speed3d:   {}
            datetime:  {:?}
            dop:       {:?}
            fix:       {:?}
            time:      {:?}",
            self.latitude,
            self.longitude,
            self.altitude,
            self.speed2d,
            self.speed3d,
            self.datetime,
            self.dop,
            self.fix,
            self.time,
        )
    }
}

impl GoProPoint {
    /// Point from a scale corrected `GPS5` sample:
    /// `[lat, lon, alt, 2D speed, 3D speed]`.
    pub fn from_gps5(sample: &Sample, rate: f64) -> Option<Self> {
        let v = sample.values();
        Some(Self {
            latitude: *v.first()?,
            longitude: *v.get(1)?,
            altitude: *v.get(2)?,
            speed2d: *v.get(3)?,
            speed3d: *v.get(4)?,
            time: Timestamp::from_seconds(sample.timestamp(), 1.0 / rate),
            ..Self::default()
        })
    }

    /// Point from a scale corrected `GPS9` sample:
    /// `[lat, lon, alt, 2D speed, 3D speed, days, secs, DOP, fix]`,
    /// where days are counted from 2000-01-01 and seconds from midnight.
    pub fn from_gps9(sample: &Sample, rate: f64) -> Option<Self> {
        let mut point = Self::from_gps5(sample, rate)?;
        let v = sample.values();
        point.datetime = Some(GPS9_EPOCH + v.get(5)?.days() + v.get(6)?.seconds());
        point.dop = Some(*v.get(7)?);
        point.fix = Some(v.get(8)?.round() as u32);
        Some(point)
    }

    pub fn datetime_to_string(&self) -> Option<Result<String, GpmfError>> {
        self.datetime.as_ref().map(primitivedatetime_to_string)
    }
}

/// GPS log, converted from a `GPS5` or `GPS9` stream.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Gps(pub Vec<GoProPoint>);

impl Gps {
    /// Points for a `GPS5` or `GPS9` stream. Other streams return an empty log.
    pub fn from_stream(stream: &Stream) -> Self {
        let rate = stream.sample_rate();
        let convert: fn(&Sample, f64) -> Option<GoProPoint> = match stream.fourcc() {
            FourCC::GPS5 => GoProPoint::from_gps5,
            FourCC::GPS9 => GoProPoint::from_gps9,
            _ => return Self::default(),
        };
        Self(stream.iter()
            .filter_map(|s| convert(s, rate))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &GoProPoint> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&GoProPoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&GoProPoint> {
        self.0.last()
    }

    /// Returns center of GPS points.
    pub fn center(&self) -> Option<GoProPoint> {
        points_average(&self.0)
    }

    /// Returns the start of the recording as `PrimitiveDateTime`.
    /// Requires a point with a logged date time and at least 2D lock
    /// (or `min_gps_fix`).
    pub fn t0(&self, min_gps_fix: Option<u32>) -> Option<PrimitiveDateTime> {
        let min = min_gps_fix.unwrap_or(2);
        self.iter()
            .find(|p| p.fix.map_or(false, |f| f >= min) && p.datetime.is_some())
            .and_then(|p| Some(p.datetime? - p.time.relative))
    }

    /// Returns the start of the recording as an RFC3339 string.
    pub fn t0_as_string(&self, min_gps_fix: Option<u32>) -> Option<String> {
        self.t0(min_gps_fix)
            .and_then(|t| primitivedatetime_to_string(&t).ok())
    }

    /// Prune points below `min_fix` satellite lock or above `max_dop`.
    /// Points that did not log fix or DOP (`GPS5`) are kept.
    ///
    /// Without satellite lock the device logs zeros or the latest known
    /// location, so both time and location will be wrong.
    pub fn prune(self, min_fix: Option<u32>, max_dop: Option<f64>) -> Self {
        let fix = min_fix.unwrap_or(u32::MIN);
        let dop = max_dop.unwrap_or(f64::MAX);
        Self(
            self.0
                .into_iter()
                .filter(|p| p.dop.map_or(true, |d| d <= dop) && p.fix.map_or(true, |f| f >= fix))
                .collect::<Vec<_>>(),
        )
    }
}

/// Returns a latitude dependent average coordinate for specified points.
pub(crate) fn points_average(points: &[GoProPoint]) -> Option<GoProPoint> {
    let first = points.first()?;
    let len = points.len() as f64;
    let deg2rad = std::f64::consts::PI / 180.0;

    let (mut lon_sin, mut lon_cos, mut lat, mut alt, mut sp2d, mut sp3d) = (0., 0., 0., 0., 0., 0.);
    for pt in points.iter() {
        lon_sin += (pt.longitude * deg2rad).sin();
        lon_cos += (pt.longitude * deg2rad).cos();
        lat += pt.latitude;
        alt += pt.altitude;
        sp2d += pt.speed2d;
        sp3d += pt.speed3d;
    }

    let dops: Vec<f64> = points.iter().filter_map(|p| p.dop).collect();

    Some(GoProPoint {
        latitude: lat / len,
        longitude: f64::atan2(lon_sin / len, lon_cos / len) / deg2rad,
        altitude: alt / len,
        speed2d: sp2d / len,
        speed3d: sp3d / len,
        // start of the span the average covers
        datetime: first.datetime,
        dop: (!dops.is_empty()).then(|| dops.iter().sum::<f64>() / dops.len() as f64),
        fix: points.iter().filter_map(|p| p.fix).min(),
        time: Timestamp {
            relative: first.time.relative,
            duration: points.iter().map(|p| p.time.duration).sum(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gps9_point() {
        // 2023-01-02 00:01:00.5
        let values = [55.7, 13.2, 80.0, 1.5, 1.6, 8402.0, 60.5, 1.2, 3.0];
        let sample = Sample::new(FourCC::GPS9, 0.5, &values);
        let point = GoProPoint::from_gps9(&sample, 10.0).unwrap();
        assert_eq!(point.fix, Some(3));
        assert_eq!(point.dop, Some(1.2));
        assert_eq!(point.datetime, Some(datetime!(2023-01-02 0:01:00.5)));
        assert_eq!(point.time.relative_ms(), 500);
    }

    #[test]
    fn gps5_short_sample() {
        let sample = Sample::new(FourCC::GPS5, 0.0, &[1.0, 2.0]);
        assert!(GoProPoint::from_gps5(&sample, 18.0).is_none());
    }

    #[test]
    fn center_across_antimeridian() {
        let points = Gps(vec![
            GoProPoint { latitude: 10.0, longitude: 179.0, ..Default::default() },
            GoProPoint { latitude: 20.0, longitude: -179.0, ..Default::default() },
        ]);
        let center = points.center().unwrap();
        assert!((center.latitude - 15.0).abs() < 1e-9);
        assert!((center.longitude.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn prune_keeps_unlogged() {
        let gps = Gps(vec![
            GoProPoint { fix: Some(0), ..Default::default() },
            GoProPoint { fix: Some(3), dop: Some(1.0), ..Default::default() },
            GoProPoint::default(),
        ]);
        assert_eq!(gps.prune(Some(2), Some(5.0)).len(), 2);
    }
}
