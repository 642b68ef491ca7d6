use crate::models::AqiRecord;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One resolved image-to-measurement association.
///
/// The join result consumed by the materializer: an image filename plus the
/// fields of the AQI record its district matched. `pm25` is the regression
/// label and is required; images matching stations without a PM2.5 reading
/// are dropped at join time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRow {
    pub image_name: String,
    pub station: String,
    pub pm25: f64,
    pub pm10: Option<f64>,
    pub dominant_pollutant: Option<String>,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl MappingRow {
    /// Build a row from a matched AQI record; `None` when the record has no
    /// usable label.
    pub fn from_match(image_name: &str, record: &AqiRecord) -> Option<Self> {
        let pm25 = record.pm25?;
        Some(Self {
            image_name: image_name.to_string(),
            station: record.station.clone(),
            pm25,
            pm10: record.pm10,
            dominant_pollutant: record.dominant_pollutant.clone(),
            timestamp: record.timestamp,
            temperature: record.temperature,
            humidity: record.humidity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pm25: Option<f64>) -> AqiRecord {
        AqiRecord::new(
            "Jongno-gu, Seoul".to_string(),
            37.572025,
            126.979367,
            pm25,
            Some(62.0),
            Some("pm10".to_string()),
            None,
            None,
            None,
        )
    }

    #[test]
    fn test_from_match_carries_fields() {
        let row = MappingRow::from_match("google_Jongno-gu_sky_00000.jpg", &record(Some(41.0)))
            .expect("labeled record should map");

        assert_eq!(row.image_name, "google_Jongno-gu_sky_00000.jpg");
        assert_eq!(row.station, "Jongno-gu, Seoul");
        assert_eq!(row.pm25, 41.0);
        assert_eq!(row.pm10, Some(62.0));
    }

    #[test]
    fn test_from_match_requires_label() {
        assert!(MappingRow::from_match("x.jpg", &record(None)).is_none());
    }
}
