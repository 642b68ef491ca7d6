use crate::error::{PipelineError, Result};
use crate::models::AqiRecord;
use chrono::DateTime;
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use validator::Validate;

/// Columns that must be present in an AQI table.
const REQUIRED_COLUMNS: [&str; 4] = ["Station", "Latitude", "Longitude", "PM2.5"];

/// Reader for the air-quality table consumed by the joiner.
///
/// The table is a CSV snapshot with one row per monitoring station. Station,
/// latitude and longitude must parse; pollutant and weather readings may be
/// absent (empty or a literal `Unknown`), in which case they load as `None`.
pub struct AqiReader;

impl AqiReader {
    pub fn new() -> Self {
        Self
    }

    /// Read all records, preserving file order (the joiner's first-match rule
    /// depends on it).
    pub fn read_records(&self, path: &Path) -> Result<Vec<AqiRecord>> {
        let mut reader = csv::Reader::from_reader(File::open(path)?);
        let columns = column_index(reader.headers()?, &REQUIRED_COLUMNS)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let record = self.parse_row(&row, &columns)?;
            record.validate()?;
            records.push(record);
        }

        Ok(records)
    }

    fn parse_row(
        &self,
        row: &StringRecord,
        columns: &HashMap<String, usize>,
    ) -> Result<AqiRecord> {
        let field = |name: &str| -> Option<&str> {
            columns.get(name).and_then(|&i| row.get(i)).map(str::trim)
        };

        let station = field("Station")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipelineError::MissingData("Station".to_string()))?
            .to_string();

        let latitude = parse_required_f64(field("Latitude"), "Latitude", &station)?;
        let longitude = parse_required_f64(field("Longitude"), "Longitude", &station)?;

        let timestamp = field("Timestamp")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok());

        Ok(AqiRecord::new(
            station,
            latitude,
            longitude,
            parse_optional_f64(field("PM2.5")),
            parse_optional_f64(field("PM10")),
            field("Dominant Pollutant")
                .filter(|s| !s.is_empty() && *s != "Unknown")
                .map(str::to_string),
            timestamp,
            parse_optional_f64(field("Temperature")),
            parse_optional_f64(field("Humidity")),
        ))
    }
}

impl Default for AqiReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Map required + known optional column names to their indices, failing on a
/// missing required column.
pub fn column_index(
    headers: &StringRecord,
    required: &[&str],
) -> Result<HashMap<String, usize>> {
    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_string(), i))
        .collect();

    for column in required {
        if !index.contains_key(*column) {
            return Err(PipelineError::MissingColumn(column.to_string()));
        }
    }

    Ok(index)
}

fn parse_required_f64(value: Option<&str>, column: &str, station: &str) -> Result<f64> {
    value
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            PipelineError::InvalidFormat(format!(
                "Invalid {} for station '{}'",
                column, station
            ))
        })
}

fn parse_optional_f64(value: Option<&str>) -> Option<f64> {
    value.and_then(|s| s.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "Station,Latitude,Longitude,PM2.5,PM10,Dominant Pollutant,Timestamp,Temperature,Humidity";

    #[test]
    fn test_read_records() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{}", HEADER)?;
        writeln!(
            file,
            "\"Gangnam-gu, Seoul\",37.517562,127.047282,55,80,pm25,2024-11-28T14:00:00+09:00,21,40"
        )?;
        writeln!(
            file,
            "\"Mapo-gu, Seoul\",37.554682,126.910072,Unknown,Unknown,Unknown,,Unknown,Unknown"
        )?;

        let records = AqiReader::new().read_records(file.path())?;
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].station, "Gangnam-gu, Seoul");
        assert_eq!(records[0].pm25, Some(55.0));
        assert_eq!(records[0].dominant_pollutant.as_deref(), Some("pm25"));
        assert!(records[0].timestamp.is_some());

        assert_eq!(records[1].pm25, None);
        assert_eq!(records[1].dominant_pollutant, None);
        assert_eq!(records[1].timestamp, None);

        Ok(())
    }

    #[test]
    fn test_missing_required_column_is_fatal() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "Station,Latitude,Longitude")?;
        writeln!(file, "\"Gangnam-gu, Seoul\",37.5,127.0")?;

        let result = AqiReader::new().read_records(file.path());
        assert!(matches!(result, Err(PipelineError::MissingColumn(c)) if c == "PM2.5"));

        Ok(())
    }

    #[test]
    fn test_invalid_coordinate_is_fatal() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{}", HEADER)?;
        writeln!(file, "\"Gangnam-gu, Seoul\",not-a-number,127.0,55,,,,,")?;

        assert!(AqiReader::new().read_records(file.path()).is_err());
        Ok(())
    }
}
