//! Recording summary: distance, speed, altitude, peak acceleration
//! and camera exposure ranges.

use time::Duration;

use crate::{FourCC, Gpmf, Gps, Stream};

/// Mean earth radius in meters.
const EARTH_RADIUS: f64 = 6_371_008.8;
/// Standard gravity, m/s².
const STANDARD_GRAVITY: f64 = 9.80665;
/// GPS speeds at or above this (m/s) are glitches.
const MAX_VALID_SPEED: f64 = 300.0;
/// Distance steps outside this range (m) are noise or jumps.
const MIN_STEP: f64 = 0.05;
const MAX_STEP: f64 = 100.0;

/// Summary statistics for a recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    /// Longest estimated stream duration.
    pub duration: Duration,
    /// Distance travelled in meters.
    pub distance: f64,
    /// Max 2D speed, m/s.
    pub max_speed: f64,
    /// Average 2D speed, m/s.
    pub avg_speed: f64,
    pub min_altitude: Option<f64>,
    pub max_altitude: Option<f64>,
    /// Peak accelerometer magnitude, m/s².
    pub max_acceleration: Option<f64>,
    pub min_iso: Option<f64>,
    pub max_iso: Option<f64>,
    /// Average white balance, Kelvin.
    pub avg_white_balance: Option<f64>,
}

impl Statistics {
    pub fn new(gpmf: &Gpmf) -> Self {
        let gps = gpmf.gps();
        let speeds = gps.iter()
            .map(|p| p.speed2d)
            .filter(|s| *s < MAX_VALID_SPEED)
            .collect::<Vec<_>>();
        let iso = gpmf.find(&FourCC::ISOE)
            .or_else(|| gpmf.find(&FourCC::ISOG))
            .map(|s| s.column(0))
            .unwrap_or_default();

        Self {
            duration: gpmf.duration(),
            distance: distance(&gps),
            max_speed: speeds.iter().copied().fold(0.0, f64::max),
            avg_speed: mean(&speeds).unwrap_or(0.0),
            min_altitude: min(gps.iter().map(|p| p.altitude)),
            max_altitude: max(gps.iter().map(|p| p.altitude)),
            max_acceleration: gpmf.find(&FourCC::ACCL).and_then(max_magnitude),
            min_iso: min(iso.iter().copied()),
            max_iso: max(iso.iter().copied()),
            avg_white_balance: gpmf.find(&FourCC::WBAL)
                .and_then(|s| mean(&s.column(0))),
        }
    }

    /// Peak acceleration in G.
    pub fn max_g_force(&self) -> Option<f64> {
        self.max_acceleration.map(|a| a / STANDARD_GRAVITY)
    }
}

/// Great-circle distance in meters between two coordinates in degrees.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Sum of the steps between consecutive points,
/// ignoring jitter and jumps.
fn distance(gps: &Gps) -> f64 {
    gps.0.windows(2)
        .map(|w| haversine(w[0].latitude, w[0].longitude, w[1].latitude, w[1].longitude))
        .filter(|d| *d > MIN_STEP && *d < MAX_STEP)
        .sum()
}

fn max_magnitude(stream: &Stream) -> Option<f64> {
    max(stream.iter()
        .filter(|s| s.values().len() >= 3)
        .map(|s| s.values()[..3].iter().map(|v| v * v).sum::<f64>().sqrt()))
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn min(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.reduce(f64::min)
}

fn max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.reduce(f64::max)
}
