use std::fmt::Write;

use checkweather_core::WeatherData;

/// Human-readable summary of a lookup.
pub fn render(data: &WeatherData) -> String {
    let mut out = String::new();
    let c = &data.current;

    // writing into a String cannot fail
    let _ = writeln!(out, "{}", data.location);
    let _ = writeln!(
        out,
        "  Now: {:.1}°C, {}, humidity {}%, wind {:.1} km/h",
        c.temperature, c.condition, c.humidity, c.wind_speed
    );

    if let Some(alert) = &data.alert {
        let _ = writeln!(out, "  Alert: {alert}");
    }

    if !data.forecast.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {:<10}  {:>6}  {:>6}  Condition", "Date", "Max", "Min");
        for day in &data.forecast {
            let _ = writeln!(
                out,
                "  {:<10}  {:>6.1}  {:>6.1}  {}",
                day.date, day.temp_max, day.temp_min, day.condition
            );
        }
    }

    out
}
