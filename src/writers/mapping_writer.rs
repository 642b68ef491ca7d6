use crate::error::Result;
use crate::models::MappingRow;
use std::fs::{self, File};
use std::path::Path;

/// Writer for the image-to-AQI mapping CSV.
pub struct MappingWriter;

impl MappingWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_rows(&self, rows: &[MappingRow], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.write_record([
            "Image Name",
            "District",
            "PM2.5",
            "PM10",
            "Dominant Pollutant",
            "Timestamp",
            "Temperature",
            "Humidity",
        ])?;

        for row in rows {
            writer.write_record([
                row.image_name.as_str(),
                row.station.as_str(),
                &row.pm25.to_string(),
                &optional_number(row.pm10),
                row.dominant_pollutant.as_deref().unwrap_or(""),
                &row.timestamp
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                &optional_number(row.temperature),
                &optional_number(row.humidity),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for MappingWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
