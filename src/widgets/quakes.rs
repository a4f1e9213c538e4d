//! Seismic activity widget and derived threat level
//!
//! Earthquake data comes from the USGS significant-quakes GeoJSON feed.
//! The threat widget condenses recent activity into a DEFCON-style level
//! for the dashboard header.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::cache::ResponseCache;

const QUAKE_TTL: Duration = Duration::from_secs(120);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USGS_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_day.geojson";

/// Recent quakes at or above `min_magnitude`, strongest first, capped at 10.
pub async fn earthquakes(
    client: &reqwest::Client,
    cache: &ResponseCache<Value>,
    min_magnitude: f64,
) -> Option<Value> {
    let client = client.clone();
    cache
        .get_or_fetch("usgs_earthquakes", QUAKE_TTL, || async move {
            let data: Value = client
                .get(USGS_FEED_URL)
                .timeout(FETCH_TIMEOUT)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok(Value::Array(parse_quakes(&data, min_magnitude)))
        })
        .await
}

/// Aggregate threat payload: DEFCON level keyed off the strongest recent
/// quake, plus the top five quakes for the detail panel.
pub async fn threat_status(
    client: &reqwest::Client,
    cache: &ResponseCache<Value>,
) -> Option<Value> {
    let client = client.clone();
    cache
        .get_or_fetch("threat_status", QUAKE_TTL, || async move {
            let data: Value = client
                .get(USGS_FEED_URL)
                .timeout(FETCH_TIMEOUT)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            let quakes = parse_quakes(&data, 4.5);
            Ok(build_threat_payload(&quakes))
        })
        .await
}

fn parse_quakes(feed: &Value, min_magnitude: f64) -> Vec<Value> {
    let mut quakes: Vec<Value> = feed["features"]
        .as_array()
        .map(|features| features.iter().filter_map(|f| parse_feature(f, min_magnitude)).collect())
        .unwrap_or_default();

    quakes.sort_by(|a, b| {
        let ma = a["magnitude"].as_f64().unwrap_or(0.0);
        let mb = b["magnitude"].as_f64().unwrap_or(0.0);
        mb.partial_cmp(&ma).unwrap_or(std::cmp::Ordering::Equal)
    });
    quakes.truncate(10);
    quakes
}

fn parse_feature(feature: &Value, min_magnitude: f64) -> Option<Value> {
    let props = &feature["properties"];
    let magnitude = props["mag"].as_f64()?;
    if magnitude < min_magnitude {
        return None;
    }

    let coords = feature["geometry"]["coordinates"].as_array();
    let depth_km = coords
        .and_then(|c| c.get(2))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let (time, date) = match props["time"].as_i64() {
        Some(millis) => match Utc.timestamp_millis_opt(millis).single() {
            Some(dt) => (
                dt.format("%H:%M UTC").to_string(),
                dt.format("%Y-%m-%d").to_string(),
            ),
            None => ("Unknown".to_string(), "Unknown".to_string()),
        },
        None => ("Unknown".to_string(), "Unknown".to_string()),
    };

    Some(json!({
        "magnitude": (magnitude * 10.0).round() / 10.0,
        "place": props["place"].as_str().unwrap_or("Unknown location"),
        "time": time,
        "date": date,
        "depth_km": (depth_km * 10.0).round() / 10.0,
        "url": props["url"].as_str().unwrap_or(""),
        "alert": props["alert"].clone(),
        "tsunami": props["tsunami"].as_i64().unwrap_or(0),
        "felt": props["felt"].as_i64().unwrap_or(0),
    }))
}

fn build_threat_payload(quakes: &[Value]) -> Value {
    let mut level_num = 5i64;
    for quake in quakes {
        let magnitude = quake["magnitude"].as_f64().unwrap_or(0.0);
        if magnitude >= 7.0 {
            level_num = level_num.min(2);
        } else if magnitude >= 6.0 {
            level_num = level_num.min(3);
        }
    }

    let (level, status, color) = match level_num {
        1 => ("DEFCON 1", "MAXIMUM", "red"),
        2 => ("DEFCON 2", "HIGH", "orange"),
        3 => ("DEFCON 3", "INCREASED", "yellow"),
        4 => ("DEFCON 4", "ELEVATED", "blue"),
        _ => ("DEFCON 5", "NOMINAL", "green"),
    };

    json!({
        "level": level,
        "level_num": level_num,
        "status": status,
        "color": color,
        "earthquakes": quakes.iter().take(5).cloned().collect::<Vec<_>>(),
        "alerts_count": quakes.iter()
            .filter(|q| q["magnitude"].as_f64().unwrap_or(0.0) >= 6.0)
            .count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_with_magnitudes(mags: &[f64]) -> Value {
        let features: Vec<Value> = mags
            .iter()
            .map(|m| {
                json!({
                    "properties": {
                        "mag": m,
                        "place": "somewhere",
                        "time": 1_700_000_000_000i64,
                        "url": "https://example.org",
                        "tsunami": 0,
                    },
                    "geometry": { "coordinates": [0.0, 0.0, 12.34] },
                })
            })
            .collect();
        json!({ "features": features })
    }

    #[test]
    fn test_parse_quakes_filters_and_sorts_descending() {
        let feed = feed_with_magnitudes(&[5.1, 4.0, 6.3]);
        let quakes = parse_quakes(&feed, 4.5);
        assert_eq!(quakes.len(), 2);
        assert_eq!(quakes[0]["magnitude"], 6.3);
        assert_eq!(quakes[1]["magnitude"], 5.1);
        assert_eq!(quakes[0]["depth_km"], 12.3);
    }

    #[test]
    fn test_threat_level_nominal_without_major_quakes() {
        let quakes = parse_quakes(&feed_with_magnitudes(&[4.6, 5.0]), 4.5);
        let threat = build_threat_payload(&quakes);
        assert_eq!(threat["level"], "DEFCON 5");
        assert_eq!(threat["color"], "green");
        assert_eq!(threat["alerts_count"], 0);
    }

    #[test]
    fn test_threat_level_escalates_with_magnitude() {
        let quakes = parse_quakes(&feed_with_magnitudes(&[6.1]), 4.5);
        assert_eq!(build_threat_payload(&quakes)["level"], "DEFCON 3");

        let quakes = parse_quakes(&feed_with_magnitudes(&[7.4]), 4.5);
        let threat = build_threat_payload(&quakes);
        assert_eq!(threat["level"], "DEFCON 2");
        assert_eq!(threat["status"], "HIGH");
    }

    #[test]
    fn test_empty_feed_parses_to_empty_list() {
        assert!(parse_quakes(&json!({}), 4.5).is_empty());
    }
}
