//! Export streams as CSV, GPS as GeoJSON, GPX or KML.
//!
//! All writers take a decimation `step`: every `step`-th sample is kept,
//! `0` and `1` keep all.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{Gps, Gpmf, GpmfError, Stream};

/// Write `stream` as CSV: relative time in seconds,
/// then one column per captured element.
/// Rows are cut or padded with empty cells to the header width.
pub fn write_csv<W: Write>(stream: &Stream, writer: &mut W, step: usize) -> Result<(), GpmfError> {
    let columns = stream.captured_elements();
    let fourcc = stream.fourcc().to_str();

    let mut header = vec!["time".to_owned()];
    header.extend((0..columns).map(|i| format!("{}_{i}", fourcc.trim())));
    writeln!(writer, "{}", header.join(","))?;

    for sample in stream.iter().step_by(step.max(1)) {
        let row = std::iter::once(sample.timestamp().to_string())
            .chain((0..columns).map(|i| sample.get(i).map(|v| v.to_string()).unwrap_or_default()))
            .collect::<Vec<_>>();
        writeln!(writer, "{}", row.join(","))?;
    }

    Ok(())
}

/// Write one CSV file per stream to `dir`, named `<basename>_<FOURCC>.csv`.
/// Returns the paths written.
pub fn csv_to_dir(gpmf: &Gpmf, dir: &Path, basename: &str, step: usize) -> Result<Vec<PathBuf>, GpmfError> {
    let mut paths = Vec::with_capacity(gpmf.len());
    for stream in gpmf.iter() {
        let path = dir.join(format!("{basename}_{}.csv", stream.fourcc().to_str().trim()));
        let mut writer = BufWriter::new(File::create(&path)?);
        write_csv(stream, &mut writer, step)?;
        writer.flush()?;
        paths.push(path);
    }
    Ok(paths)
}

/// GPS log as a GeoJSON feature collection: one `LineString` for the track,
/// followed by one `Point` per (decimated) point.
pub fn gps_to_geojson(gps: &Gps, step: usize) -> FeatureCollection {
    let points = gps.iter()
        .step_by(step.max(1))
        .collect::<Vec<_>>();

    let mut features = Vec::with_capacity(points.len() + 1);

    if points.len() > 1 {
        let line = points.iter()
            .map(|p| vec![p.longitude, p.latitude, p.altitude])
            .collect::<Vec<_>>();
        features.push(Feature::from(Geometry::new(Value::LineString(line))));
    }

    for point in points.iter() {
        let mut feature = Feature::from(Geometry::new(
            Value::Point(vec![point.longitude, point.latitude, point.altitude])
        ));
        feature.set_property("time", point.time.relative.as_seconds_f64());
        feature.set_property("speed2d", point.speed2d);
        feature.set_property("speed3d", point.speed3d);
        if let Some(Ok(datetime)) = point.datetime_to_string() {
            feature.set_property("datetime", datetime);
        }
        if let Some(dop) = point.dop {
            feature.set_property("dop", dop);
        }
        if let Some(fix) = point.fix {
            feature.set_property("fix", fix);
        }
        features.push(feature);
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Write the GPS log of `gpmf` (`GPS9` preferred) as GeoJSON to `path`.
pub fn write_geojson(gpmf: &Gpmf, path: &Path, step: usize) -> Result<(), GpmfError> {
    let gps = gpmf.gps();
    let geojson = GeoJson::from(gps_to_geojson(&gps, step));
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(geojson.to_string().as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Track name for GPX/KML when the source has no file name.
const DEFAULT_TRACK_NAME: &str = "GoPro Telemetry Track";

fn start<W: Write>(xml: &mut Writer<W>, name: &str, attributes: &[(&str, &str)]) -> Result<(), GpmfError> {
    xml.write_event(Event::Start(BytesStart::new(name).with_attributes(attributes.iter().copied())))?;
    Ok(())
}

fn end<W: Write>(xml: &mut Writer<W>, name: &str) -> Result<(), GpmfError> {
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `<name>text</name>`, text escaped.
fn element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> Result<(), GpmfError> {
    start(xml, name, &[])?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    end(xml, name)
}

fn xml_writer<W: Write>(writer: W) -> Result<Writer<W>, GpmfError> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(xml)
}

fn track_name(gpmf: &Gpmf) -> String {
    gpmf.source.first()
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_TRACK_NAME.to_owned())
}

/// GPS log as a GPX 1.1 track, one `trkpt` per (decimated) point.
/// `time`, `fix` and `pdop` are only written for `GPS9` points.
pub fn gps_to_gpx<W: Write>(gps: &Gps, name: &str, writer: W, step: usize) -> Result<W, GpmfError> {
    let mut xml = xml_writer(writer)?;
    start(&mut xml, "gpx", &[
        ("version", "1.1"),
        ("creator", env!("CARGO_PKG_NAME")),
        ("xmlns", "http://www.topografix.com/GPX/1/1"),
    ])?;

    start(&mut xml, "metadata", &[])?;
    element(&mut xml, "name", name)?;
    if let Some(t0) = gps.t0_as_string(None) {
        element(&mut xml, "time", &t0)?;
    }
    end(&mut xml, "metadata")?;

    start(&mut xml, "trk", &[])?;
    element(&mut xml, "name", name)?;
    start(&mut xml, "trkseg", &[])?;
    for point in gps.iter().step_by(step.max(1)) {
        let (lat, lon) = (point.latitude.to_string(), point.longitude.to_string());
        start(&mut xml, "trkpt", &[("lat", lat.as_str()), ("lon", lon.as_str())])?;
        element(&mut xml, "ele", &point.altitude.to_string())?;
        if let Some(Ok(datetime)) = point.datetime_to_string() {
            element(&mut xml, "time", &datetime)?;
        }
        match point.fix {
            Some(0) => element(&mut xml, "fix", "none")?,
            Some(2) => element(&mut xml, "fix", "2d")?,
            Some(3) => element(&mut xml, "fix", "3d")?,
            _ => (),
        }
        if let Some(dop) = point.dop {
            element(&mut xml, "pdop", &dop.to_string())?;
        }
        start(&mut xml, "extensions", &[])?;
        element(&mut xml, "speed", &point.speed2d.to_string())?;
        end(&mut xml, "extensions")?;
        end(&mut xml, "trkpt")?;
    }
    end(&mut xml, "trkseg")?;
    end(&mut xml, "trk")?;
    end(&mut xml, "gpx")?;

    Ok(xml.into_inner())
}

/// GPS log as a KML document with a single path placemark,
/// altitude absolute.
pub fn gps_to_kml<W: Write>(gps: &Gps, name: &str, writer: W, step: usize) -> Result<W, GpmfError> {
    let coordinates = gps.iter()
        .step_by(step.max(1))
        .map(|p| format!("{},{},{}", p.longitude, p.latitude, p.altitude))
        .collect::<Vec<_>>()
        .join(" ");

    let mut xml = xml_writer(writer)?;
    start(&mut xml, "kml", &[("xmlns", "http://www.opengis.net/kml/2.2")])?;
    start(&mut xml, "Document", &[])?;
    element(&mut xml, "name", name)?;
    element(&mut xml, "description", &format!("{} points", gps.len()))?;

    start(&mut xml, "Style", &[("id", "pathStyle")])?;
    start(&mut xml, "LineStyle", &[])?;
    element(&mut xml, "color", "7f00ffff")?;
    element(&mut xml, "width", "4")?;
    end(&mut xml, "LineStyle")?;
    end(&mut xml, "Style")?;

    start(&mut xml, "Placemark", &[])?;
    element(&mut xml, "name", "Path")?;
    element(&mut xml, "styleUrl", "#pathStyle")?;
    start(&mut xml, "LineString", &[])?;
    element(&mut xml, "extrude", "1")?;
    element(&mut xml, "tessellate", "1")?;
    element(&mut xml, "altitudeMode", "absolute")?;
    element(&mut xml, "coordinates", &coordinates)?;
    end(&mut xml, "LineString")?;
    end(&mut xml, "Placemark")?;

    end(&mut xml, "Document")?;
    end(&mut xml, "kml")?;

    Ok(xml.into_inner())
}

/// Write the GPS log of `gpmf` (`GPS9` preferred) as GPX to `path`.
/// The track is named after the source file.
pub fn write_gpx(gpmf: &Gpmf, path: &Path, step: usize) -> Result<(), GpmfError> {
    let writer = BufWriter::new(File::create(path)?);
    gps_to_gpx(&gpmf.gps(), &track_name(gpmf), writer, step)?.flush()?;
    Ok(())
}

/// Write the GPS log of `gpmf` (`GPS9` preferred) as KML to `path`.
pub fn write_kml(gpmf: &Gpmf, path: &Path, step: usize) -> Result<(), GpmfError> {
    let writer = BufWriter::new(File::create(path)?);
    gps_to_kml(&gpmf.gps(), &track_name(gpmf), writer, step)?.flush()?;
    Ok(())
}
