//! Territory definitions for the conflict map.
//!
//! Territories are enumerated in a closed set; metadata lives in a
//! compile-time lookup table indexed by the enum discriminant.

use serde::{Deserialize, Serialize};

/// The number of territories on the map.
pub const TERRITORY_COUNT: usize = 10;

/// A territory on the map.
///
/// The `#[repr(u8)]` attribute enables use as an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Territory {
    Citadel = 0,
    Harbor = 1,
    Lowlands = 2,
    Saltflats = 3,
    Oasis = 4,
    Ridge = 5,
    Basin = 6,
    Dunes = 7,
    Terminus = 8,
    Quarry = 9,
}

/// All territories in index order.
pub const ALL_TERRITORIES: [Territory; TERRITORY_COUNT] = [
    Territory::Citadel,
    Territory::Harbor,
    Territory::Lowlands,
    Territory::Saltflats,
    Territory::Oasis,
    Territory::Ridge,
    Territory::Basin,
    Territory::Dunes,
    Territory::Terminus,
    Territory::Quarry,
];

impl Territory {
    /// Returns the lowercase display name of this territory.
    pub const fn name(self) -> &'static str {
        match self {
            Territory::Citadel => "citadel",
            Territory::Harbor => "harbor",
            Territory::Lowlands => "lowlands",
            Territory::Saltflats => "saltflats",
            Territory::Oasis => "oasis",
            Territory::Ridge => "ridge",
            Territory::Basin => "basin",
            Territory::Dunes => "dunes",
            Territory::Terminus => "terminus",
            Territory::Quarry => "quarry",
        }
    }

    /// Looks up a territory by its lowercase display name.
    pub fn from_name(name: &str) -> Option<Territory> {
        ALL_TERRITORIES.iter().copied().find(|t| t.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip() {
        for t in ALL_TERRITORIES {
            assert_eq!(Territory::from_name(t.name()), Some(t));
        }
        assert_eq!(Territory::from_name("nowhere"), None);
    }

    #[test]
    fn indices_are_contiguous() {
        for (i, t) in ALL_TERRITORIES.iter().enumerate() {
            assert_eq!(*t as usize, i);
        }
    }
}
