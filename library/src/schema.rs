table! {
    readings (timestamp) {
        timestamp -> Text,
        temp_f -> Nullable<Double>,
        humidity -> Nullable<Double>,
        wind_speed_mph -> Nullable<Double>,
        wind_dir -> Nullable<Double>,
        rain_rate_in -> Nullable<Double>,
        uv -> Nullable<Double>,
        solar_rad -> Nullable<Double>,
        pressure_rel_in -> Nullable<Double>,
        raw_json -> Text,
    }
}
