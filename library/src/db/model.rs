use crate::schema::readings;
use serde::Serialize;
use serde_json::Value;

/// Upstream field that carries the observation time, rewritten on the way out
pub const UPSTREAM_TIMESTAMP_FIELD: &str = "dateutc";

#[derive(Insertable, Debug, Clone, PartialEq)]
#[table_name = "readings"]
pub struct NewReading {
    pub timestamp: String,
    pub temp_f: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed_mph: Option<f64>,
    pub wind_dir: Option<f64>,
    pub rain_rate_in: Option<f64>,
    pub uv: Option<f64>,
    pub solar_rad: Option<f64>,
    pub pressure_rel_in: Option<f64>,
    pub raw_json: String,
}

/// One stored observation. Serializes to the flat column set; the raw
/// upstream payload is only exposed through `to_upstream_shape`.
#[derive(Queryable, Serialize, Debug, Clone, PartialEq)]
pub struct DbReading {
    pub timestamp: String,
    pub temp_f: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed_mph: Option<f64>,
    pub wind_dir: Option<f64>,
    pub rain_rate_in: Option<f64>,
    pub uv: Option<f64>,
    pub solar_rad: Option<f64>,
    pub pressure_rel_in: Option<f64>,
    #[serde(skip_serializing)]
    pub raw_json: String,
}

impl DbReading {
    /// Rebuild the upstream `lastData` object with its timestamp replaced by
    /// the stored key. Falls back to the flat columns when the raw payload
    /// is not a JSON object (rows written by older deployments stored a
    /// non-JSON repr).
    pub fn to_upstream_shape(&self) -> Value {
        match serde_json::from_str::<Value>(&self.raw_json) {
            Ok(Value::Object(mut raw)) => {
                raw.insert(
                    UPSTREAM_TIMESTAMP_FIELD.to_owned(),
                    Value::String(self.timestamp.clone()),
                );
                Value::Object(raw)
            }
            Ok(_) | Err(_) => self.to_flat(),
        }
    }

    pub fn to_flat(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
