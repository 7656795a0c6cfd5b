//! Turns one upstream `lastData` object into a `NewReading`.
use chrono::{SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::db::model::NewReading;

/// Timestamp fields in priority order: epoch milliseconds, then a date string
const TIMESTAMP_FIELDS: [&str; 2] = ["dateutc", "date"];

/// Primary key for an observation. Epoch milliseconds become an RFC 3339 UTC
/// string ending in `Z`, truncated to whole seconds so every key has the same
/// width and sorts chronologically; anything else is kept as its string form.
pub fn normalize_timestamp(last_data: &Map<String, Value>) -> Option<String> {
    let value = TIMESTAMP_FIELDS
        .iter()
        .filter_map(|field| last_data.get(*field))
        .find(|v| !v.is_null())?;

    let normalized = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .and_then(epoch_millis_to_iso)
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Some(normalized)
}

fn epoch_millis_to_iso(millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn number(last_data: &Map<String, Value>, field: &str) -> Option<f64> {
    last_data.get(field).and_then(Value::as_f64)
}

/// Map the upstream observation onto the stored columns. Missing or
/// non-numeric fields become null; `None` only when there is no timestamp.
pub fn reading_from(last_data: &Map<String, Value>) -> Option<NewReading> {
    let timestamp = normalize_timestamp(last_data)?;
    let raw_json = Value::Object(last_data.clone()).to_string();

    Some(NewReading {
        timestamp,
        temp_f: number(last_data, "tempf"),
        humidity: number(last_data, "humidity"),
        wind_speed_mph: number(last_data, "windspeedmph"),
        wind_dir: number(last_data, "winddir"),
        rain_rate_in: number(last_data, "hourlyrainin"),
        uv: number(last_data, "uv"),
        solar_rad: number(last_data, "solarradiation"),
        pressure_rel_in: number(last_data, "baromrelin"),
        raw_json,
    })
}
