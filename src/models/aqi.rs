use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One air-quality measurement for a district monitoring station.
///
/// A single record per district per pipeline run; this is a snapshot table,
/// not a time series.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AqiRecord {
    #[validate(length(min = 1))]
    pub station: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub pm25: Option<f64>,

    pub pm10: Option<f64>,

    pub dominant_pollutant: Option<String>,

    pub timestamp: Option<DateTime<FixedOffset>>,

    pub temperature: Option<f64>,

    pub humidity: Option<f64>,
}

impl AqiRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        station: String,
        latitude: f64,
        longitude: f64,
        pm25: Option<f64>,
        pm10: Option<f64>,
        dominant_pollutant: Option<String>,
        timestamp: Option<DateTime<FixedOffset>>,
        temperature: Option<f64>,
        humidity: Option<f64>,
    ) -> Self {
        Self {
            station,
            latitude,
            longitude,
            pm25,
            pm10,
            dominant_pollutant,
            timestamp,
            temperature,
            humidity,
        }
    }

    /// Whether the record carries the pollutant value used as the training label
    pub fn has_label(&self) -> bool {
        self.pm25.is_some()
    }

    /// Case-insensitive substring match against the station name
    pub fn matches_district(&self, district: &str) -> bool {
        self.station
            .to_lowercase()
            .contains(&district.to_lowercase())
    }
}
