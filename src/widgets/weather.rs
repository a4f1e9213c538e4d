//! Weather widget backed by Open-Meteo (free, no API key)

use std::time::Duration;

use serde_json::{json, Value};

use crate::cache::ResponseCache;

const WEATHER_TTL: Duration = Duration::from_secs(600);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Coordinates used when no location is configured.
const FALLBACK_COORDS: (f64, f64) = (34.0, -81.0);

pub async fn fetch(
    client: &reqwest::Client,
    cache: &ResponseCache<Value>,
    city: Option<&str>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Option<Value> {
    let city = city.unwrap_or("auto");
    let (lat, lon, cache_key) = match (lat, lon) {
        (Some(lat), Some(lon)) => (lat, lon, format!("weather_{lat}_{lon}")),
        _ => (
            FALLBACK_COORDS.0,
            FALLBACK_COORDS.1,
            format!("weather_{city}"),
        ),
    };

    let client = client.clone();
    let city = city.to_string();
    cache
        .get_or_fetch(&cache_key, WEATHER_TTL, || async move {
            let url = format!(
                "https://api.open-meteo.com/v1/forecast\
                 ?latitude={lat}&longitude={lon}\
                 &current=temperature_2m,relative_humidity_2m,apparent_temperature,\
                 weather_code,wind_speed_10m,wind_direction_10m\
                 &temperature_unit=fahrenheit&wind_speed_unit=mph&timezone=auto"
            );
            let resp = client
                .get(&url)
                .timeout(FETCH_TIMEOUT)
                .send()
                .await?
                .error_for_status()?;
            let data: Value = resp.json().await?;
            let current = data.get("current").cloned().unwrap_or_else(|| json!({}));

            let temp_f = current["temperature_2m"].as_f64().unwrap_or(0.0);
            let feels_f = current["apparent_temperature"].as_f64().unwrap_or(temp_f);
            let code = current["weather_code"].as_i64().unwrap_or(0);
            let city_name = if city == "auto" {
                format!("{lat:.2}, {lon:.2}")
            } else {
                city.clone()
            };

            Ok(json!({
                "temp_c": format!("{}", f_to_c(temp_f) as i64),
                "temp_f": format!("{}", temp_f as i64),
                "feels_like_c": format!("{}", f_to_c(feels_f) as i64),
                "condition": code_to_condition(code),
                "humidity": format!("{}", current["relative_humidity_2m"].as_f64().unwrap_or(0.0) as i64),
                "wind_mph": format!("{}", current["wind_speed_10m"].as_f64().unwrap_or(0.0) as i64),
                "wind_dir": degrees_to_direction(current["wind_direction_10m"].as_f64().unwrap_or(0.0)),
                "city": city_name,
                "country": "",
                "icon": code_to_icon(code),
            }))
        })
        .await
}

fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Map a WMO weather code to a display condition.
fn code_to_condition(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing Rime Fog",
        51 => "Light Drizzle",
        53 => "Drizzle",
        55 => "Dense Drizzle",
        56 | 57 => "Freezing Drizzle",
        61 => "Slight Rain",
        63 => "Rain",
        65 => "Heavy Rain",
        66 | 67 => "Freezing Rain",
        71 => "Slight Snow",
        73 => "Snow",
        75 => "Heavy Snow",
        77 => "Snow Grains",
        80 => "Rain Showers",
        81 => "Moderate Showers",
        82 => "Violent Showers",
        85 | 86 => "Snow Showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm w/ Hail",
        99 => "Severe Thunderstorm",
        _ => "Unknown",
    }
}

/// Map a WMO weather code to a Font Awesome icon class.
fn code_to_icon(code: i64) -> &'static str {
    match code {
        0 => "fa-sun",
        1 | 2 => "fa-cloud-sun",
        3 => "fa-cloud",
        45 | 48 => "fa-smog",
        51..=57 | 61..=67 | 80..=82 => "fa-cloud-rain",
        71..=77 | 85 | 86 => "fa-snowflake",
        95..=99 => "fa-cloud-bolt",
        _ => "fa-cloud",
    }
}

/// 16-point compass direction for a wind bearing in degrees.
fn degrees_to_direction(degrees: f64) -> &'static str {
    const DIRECTIONS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let normalized = degrees.rem_euclid(360.0);
    let idx = ((normalized + 11.25) / 22.5) as usize % 16;
    DIRECTIONS[idx]
}
