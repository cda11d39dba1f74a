//! CSV samples and residual reports

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Writer};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::samples::{SamplePoint, SampleSet};

/// One CSV row. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct SampleRecord {
    #[serde(alias = "x", alias = "longitude", alias = "LON", alias = "Lon")]
    lon: f64,
    #[serde(alias = "y", alias = "latitude", alias = "LAT", alias = "Lat")]
    lat: f64,
    #[serde(alias = "z", alias = "VALUE", alias = "Value")]
    value: f64,
}

/// Load scattered samples from a CSV file with a header row.
///
/// Recognised headers are `lon`, `lat`, `value` (also `x`/`longitude`,
/// `y`/`latitude`, `z`). The returned set is validated.
pub fn read_samples_csv<P: AsRef<Path>>(path: P) -> Result<SampleSet> {
    let file = File::open(path.as_ref())?;
    read_samples_from_reader(file)
}

/// Same as [`read_samples_csv`] for any reader
pub fn read_samples_from_reader<R: Read>(reader: R) -> Result<SampleSet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for record in reader.deserialize() {
        let record: SampleRecord = record?;
        points.push(SamplePoint::new(record.lon, record.lat, record.value));
    }

    let samples = SampleSet::from_points(&points);
    samples.validate()?;
    Ok(samples)
}

/// Write each sample with its residual (`value - analysed value`)
pub fn write_residuals_csv<P: AsRef<Path>>(
    path: P,
    samples: &SampleSet,
    residuals: &[f64],
) -> Result<()> {
    if residuals.len() != samples.len() {
        return Err(Error::SizeMismatch {
            name: "residuals",
            expected: samples.len(),
            actual: residuals.len(),
        });
    }

    let mut wtr = Writer::from_path(path.as_ref())?;
    wtr.write_record(["lon", "lat", "value", "residual"])?;
    for (p, r) in samples.points().zip(residuals) {
        wtr.write_record(&[
            p.lon.to_string(),
            p.lat.to_string(),
            p.value.to_string(),
            r.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
