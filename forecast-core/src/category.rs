//! Layout of measurement categories within one forecast hour.
//!
//! The feed enumerates every forecast hour as a block of rows, one per
//! category, always in the same order. Two hours carry one extra daily
//! category at the end of their block.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Hourly temperature (°C).
    Tmp,
    /// East-west wind component (m/s).
    Uuu,
    /// North-south wind component (m/s).
    Vvv,
    /// Wind direction (deg).
    Vec,
    /// Wind speed (m/s).
    Wsd,
    /// Sky status code.
    Sky,
    /// Precipitation type code.
    Pty,
    /// Precipitation probability (%).
    Pop,
    /// Wave height (m).
    Wav,
    /// Hourly precipitation amount.
    Pcp,
    /// Relative humidity (%).
    Reh,
    /// Hourly snowfall.
    Sno,
    /// Daily minimum temperature (°C).
    Tmn,
    /// Daily maximum temperature (°C).
    Tmx,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tmp => "TMP",
            Category::Uuu => "UUU",
            Category::Vvv => "VVV",
            Category::Vec => "VEC",
            Category::Wsd => "WSD",
            Category::Sky => "SKY",
            Category::Pty => "PTY",
            Category::Pop => "POP",
            Category::Wav => "WAV",
            Category::Pcp => "PCP",
            Category::Reh => "REH",
            Category::Sno => "SNO",
            Category::Tmn => "TMN",
            Category::Tmx => "TMX",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BASE_SEQUENCE
            .iter()
            .chain([Category::Tmn, Category::Tmx].iter())
            .find(|c| c.as_str() == value)
            .copied()
            .ok_or_else(|| format!("Unknown forecast category '{value}'"))
    }
}

/// Categories present in every forecast hour, in feed order.
pub const BASE_SEQUENCE: [Category; 12] = [
    Category::Tmp,
    Category::Uuu,
    Category::Vvv,
    Category::Vec,
    Category::Wsd,
    Category::Sky,
    Category::Pty,
    Category::Pop,
    Category::Wav,
    Category::Pcp,
    Category::Reh,
    Category::Sno,
];

/// Hour of day carrying the daily minimum temperature.
pub const TMN_HOUR: u32 = 6;
/// Hour of day carrying the daily maximum temperature.
pub const TMX_HOUR: u32 = 15;

fn extra_for(hour: u32) -> Option<Category> {
    match hour {
        TMN_HOUR => Some(Category::Tmn),
        TMX_HOUR => Some(Category::Tmx),
        _ => None,
    }
}

/// Ordered categories of the block for `hour`.
pub fn sequence_for(hour: u32) -> Vec<Category> {
    let mut sequence = BASE_SEQUENCE.to_vec();
    sequence.extend(extra_for(hour));
    sequence
}

/// Number of rows the block for `hour` occupies in the feed.
pub fn block_width(hour: u32) -> usize {
    BASE_SEQUENCE.len() + usize::from(extra_for(hour).is_some())
}

/// Position of `category` within the block for `hour`.
pub fn position_in(hour: u32, category: Category) -> Option<usize> {
    BASE_SEQUENCE
        .iter()
        .position(|&c| c == category)
        .or_else(|| (extra_for(hour) == Some(category)).then_some(BASE_SEQUENCE.len()))
}
