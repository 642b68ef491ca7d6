use crate::error::Result;
use crate::models::AqiRecord;
use chrono::DateTime;
use tracing::{info, warn};

/// Client for the AQICN geo feed.
///
/// One measurement snapshot per district coordinate; stations with no usable
/// feed are skipped rather than failing the run.
pub struct AqicnClient {
    client: reqwest::Client,
    token: String,
}

impl AqicnClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    /// Fetch the snapshot for one station coordinate.
    ///
    /// Returns `None` when the feed has no AQI data for the location.
    pub async fn fetch_station(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<AqiRecord>> {
        let url = format!(
            "https://api.waqi.info/feed/geo:{};{}/?token={}",
            latitude, longitude, self.token
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let data: serde_json::Value = response.json().await?;

        let feed = match data.get("data") {
            Some(feed) if feed.get("aqi").is_some() => feed,
            _ => return Ok(None),
        };

        let iaqi = feed.get("iaqi");
        let reading = |key: &str| -> Option<f64> {
            iaqi?.get(key)?.get("v")?.as_f64()
        };

        let timestamp = feed
            .get("time")
            .and_then(|t| t.get("iso"))
            .and_then(|iso| iso.as_str())
            .and_then(|iso| DateTime::parse_from_rfc3339(iso).ok());

        let dominant_pollutant = feed
            .get("dominentpol")
            .and_then(|p| p.as_str())
            .map(str::to_string);

        Ok(Some(AqiRecord::new(
            name.to_string(),
            latitude,
            longitude,
            reading("pm25"),
            reading("pm10"),
            dominant_pollutant,
            timestamp,
            reading("t"),
            reading("h"),
        )))
    }

    /// Fetch snapshots for a list of stations, skipping failures.
    pub async fn fetch_stations(&self, stations: &[(&str, f64, f64)]) -> Vec<AqiRecord> {
        let mut records = Vec::with_capacity(stations.len());

        for &(name, latitude, longitude) in stations {
            match self.fetch_station(name, latitude, longitude).await {
                Ok(Some(record)) => {
                    info!(
                        station = name,
                        pm25 = ?record.pm25,
                        pm10 = ?record.pm10,
                        "fetched AQI snapshot"
                    );
                    records.push(record);
                }
                Ok(None) => warn!(station = name, "no AQI data available"),
                Err(e) => warn!(station = name, error = %e, "AQI fetch failed"),
            }
        }

        records
    }
}
