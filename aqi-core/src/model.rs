use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A monitoring station with a validated air quality index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub uid: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub aqi: u32,
}

/// A station resolved to a human-readable place name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct City {
    pub name: String,
    pub aqi: u32,
}

/// Ordered list of at most [`RankedCityList::CAPACITY`] unique cities.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedCityList(Vec<City>);

impl RankedCityList {
    pub const CAPACITY: usize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Append `city` unless the list is full or already holds the same
    /// `(name, aqi)` pair. Returns whether it was added.
    pub fn try_push(&mut self, city: City) -> bool {
        if self.is_full() || self.0.contains(&city) {
            return false;
        }
        self.0.push(city);
        true
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= Self::CAPACITY
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, City> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[City] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a RankedCityList {
    type Item = &'a City;
    type IntoIter = std::slice::Iter<'a, City>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Current reading for the reference city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub station_name: String,
    pub aqi: Option<u32>,
    pub coordinates: Option<Coordinates>,
    pub dominant_pollutant: Option<String>,
    pub observed_at: Option<String>,
}

/// Pollutant concentrations in µg/m³.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Components {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    /// Provider scale, 1 (good) to 5 (very poor).
    pub aqi: u8,
    pub components: Components,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableData {
    pub dirty_cities: RankedCityList,
    pub clean_cities: RankedCityList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub chart_data: Vec<HistoryPoint>,
    pub info_now: Option<Snapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, aqi: u32) -> City {
        City {
            name: name.to_string(),
            aqi,
        }
    }

    #[test]
    fn ranked_list_rejects_duplicates() {
        let mut list = RankedCityList::new();
        assert!(list.try_push(city("Delhi", 300)));
        assert!(!list.try_push(city("Delhi", 300)));
        // same name with a different index is a different entry
        assert!(list.try_push(city("Delhi", 280)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn ranked_list_stops_at_capacity() {
        let mut list = RankedCityList::new();
        for i in 0..8 {
            list.try_push(city(&format!("City {i}"), i));
        }
        assert_eq!(list.len(), RankedCityList::CAPACITY);
        assert!(list.is_full());
        assert_eq!(list.as_slice()[4].name, "City 4");
    }

    #[test]
    fn coordinates_validity() {
        assert!(Coordinates::new(55.75, 37.61).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }
}
