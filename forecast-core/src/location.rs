//! Location id → forecast grid point lookup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ForecastError;

/// A point on the forecast grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub nx: i32,
    pub ny: i32,
    pub label: String,
}

const BUILT_IN: &[(&str, i32, i32, &str)] = &[
    ("seoul", 60, 127, "서울"),
    ("busan", 98, 76, "부산"),
    ("daegu", 89, 90, "대구"),
    ("incheon", 55, 124, "인천"),
    ("gwangju", 58, 74, "광주"),
    ("daejeon", 67, 100, "대전"),
    ("ulsan", 102, 84, "울산"),
    ("sejong", 66, 103, "세종"),
    ("suwon", 60, 121, "수원"),
    ("chuncheon", 73, 134, "춘천"),
    ("cheongju", 69, 106, "청주"),
    ("jeonju", 63, 89, "전주"),
    ("changwon", 90, 77, "창원"),
    ("jeju", 52, 38, "제주"),
];

#[derive(Debug, Clone)]
pub struct LocationDirectory {
    locations: BTreeMap<String, Location>,
}

impl Default for LocationDirectory {
    fn default() -> Self {
        let locations = BUILT_IN
            .iter()
            .map(|&(id, nx, ny, label)| {
                (
                    id.to_string(),
                    Location {
                        nx,
                        ny,
                        label: label.to_string(),
                    },
                )
            })
            .collect();
        Self { locations }
    }
}

impl LocationDirectory {
    pub fn empty() -> Self {
        Self {
            locations: BTreeMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, id: impl Into<String>, location: Location) {
        self.locations.insert(id.into().to_lowercase(), location);
    }

    pub fn resolve(&self, id: &str) -> Result<&Location, ForecastError> {
        self.locations
            .get(&id.trim().to_lowercase())
            .ok_or_else(|| ForecastError::UnknownLocation(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.locations.iter().map(|(id, loc)| (id.as_str(), loc))
    }
}
