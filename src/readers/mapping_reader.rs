use crate::error::{PipelineError, Result};
use crate::models::MappingRow;
use crate::readers::aqi_reader::column_index;
use chrono::DateTime;
use std::fs::File;
use std::path::Path;

/// Columns the materializer cannot run without.
const REQUIRED_COLUMNS: [&str; 2] = ["Image Name", "PM2.5"];

/// Reader for the image-to-AQI mapping file.
///
/// A missing file or a missing required column is a broken pipeline
/// invocation and fails fast with a named error.
pub struct MappingReader;

impl MappingReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_rows(&self, path: &Path) -> Result<Vec<MappingRow>> {
        if !path.exists() {
            return Err(PipelineError::MappingNotFound(
                path.display().to_string(),
            ));
        }

        let mut reader = csv::Reader::from_reader(File::open(path)?);
        let columns = column_index(reader.headers()?, &REQUIRED_COLUMNS)?;

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |name: &str| -> Option<&str> {
                columns.get(name).and_then(|&i| row.get(i)).map(str::trim)
            };

            let image_name = field("Image Name")
                .filter(|s| !s.is_empty())
                .ok_or_else(|| PipelineError::MissingData("Image Name".to_string()))?
                .to_string();

            let pm25 = field("PM2.5")
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| {
                    PipelineError::InvalidFormat(format!("Invalid PM2.5 for '{}'", image_name))
                })?;

            rows.push(MappingRow {
                image_name,
                station: field("District").unwrap_or_default().to_string(),
                pm25,
                pm10: field("PM10").and_then(|s| s.parse().ok()),
                dominant_pollutant: field("Dominant Pollutant")
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                timestamp: field("Timestamp")
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok()),
                temperature: field("Temperature").and_then(|s| s.parse().ok()),
                humidity: field("Humidity").and_then(|s| s.parse().ok()),
            });
        }

        Ok(rows)
    }
}

impl Default for MappingReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_rows() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "Image Name,District,PM2.5,PM10,Dominant Pollutant,Timestamp,Temperature,Humidity"
        )?;
        writeln!(
            file,
            "flickr_Gangnam-gu_sky_00000.jpg,\"Gangnam-gu, Seoul\",55,80,pm25,2024-11-28T14:00:00+09:00,21,40"
        )?;

        let rows = MappingReader::new().read_rows(file.path())?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].image_name, "flickr_Gangnam-gu_sky_00000.jpg");
        assert_eq!(rows[0].pm25, 55.0);
        assert_eq!(rows[0].humidity, Some(40.0));

        Ok(())
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = MappingReader::new().read_rows(Path::new("/nonexistent/mapping.csv"));
        assert!(matches!(result, Err(PipelineError::MappingNotFound(_))));
    }

    #[test]
    fn test_missing_label_column_is_fatal() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "Image Name,District")?;
        writeln!(file, "a.jpg,\"Gangnam-gu, Seoul\"")?;

        let result = MappingReader::new().read_rows(file.path());
        assert!(matches!(result, Err(PipelineError::MissingColumn(c)) if c == "PM2.5"));

        Ok(())
    }
}
