//! Plain-text rendering of dashboard data.

use std::fmt::Write;

use aqi_core::{ChartData, RankedCityList, TableData};

pub fn table(data: &TableData) -> String {
    let mut out = String::new();
    section(&mut out, "Cities with the dirtiest air", &data.dirty_cities);
    out.push('\n');
    section(&mut out, "Cities with the cleanest air", &data.clean_cities);
    out
}

fn section(out: &mut String, title: &str, cities: &RankedCityList) {
    let _ = writeln!(out, "{title}");
    if cities.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return;
    }
    for (rank, city) in cities.iter().enumerate() {
        let _ = writeln!(out, "  {}. {:>4}  {}", rank + 1, city.aqi, city.name);
    }
}

pub fn chart(data: &ChartData) -> String {
    let mut out = String::new();

    match &data.info_now {
        Some(now) => {
            let aqi = now
                .aqi
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = write!(out, "Now in {}: AQI {aqi}", now.station_name);
            if let Some(pol) = &now.dominant_pollutant {
                let _ = write!(out, " (dominant: {pol})");
            }
            if let Some(at) = &now.observed_at {
                let _ = write!(out, " at {at}");
            }
            out.push('\n');
        }
        None => out.push_str("Current reading unavailable\n"),
    }

    if data.chart_data.is_empty() {
        out.push_str("History unavailable\n");
        return out;
    }

    let _ = writeln!(out, "History ({} readings)", data.chart_data.len());
    let _ = writeln!(out, "  {:<17} {:>3} {:>8} {:>8}", "time (UTC)", "aqi", "pm2.5", "pm10");
    for point in &data.chart_data {
        let _ = writeln!(
            out,
            "  {:<17} {:>3} {:>8.1} {:>8.1}",
            point.timestamp.format("%Y-%m-%d %H:%M"),
            point.aqi,
            point.components.pm2_5,
            point.components.pm10,
        );
    }
    out
}
