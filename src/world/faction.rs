//! Faction identities and their battle abilities.
//!
//! The six factions form a closed set. Every cross-cutting special rule in
//! the battle core is keyed off an [`Ability`] predicate rather than a
//! faction comparison, so moving an ability between factions is a data
//! change in [`Faction::abilities`], not a control-flow change.

use serde::{Deserialize, Serialize};

/// The number of factions in the game.
pub const FACTION_COUNT: usize = 6;

/// One of the six factions.
///
/// The `#[repr(u8)]` attribute enables use as an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Faction {
    /// Holders of the pre-commitment foresight query and the leader escort.
    Seers = 0,
    /// Holders of the compulsion ability; deploy non-combat envoys.
    Covenant = 1,
    /// Holders of the leader-capture ability.
    Syndicate = 2,
    /// Field elite shock forces.
    Nomads = 3,
    /// Field elite guard forces.
    Imperium = 4,
    /// No battle ability.
    Cartel = 5,
}

/// All six factions in index order.
pub const ALL_FACTIONS: [Faction; FACTION_COUNT] = [
    Faction::Seers,
    Faction::Covenant,
    Faction::Syndicate,
    Faction::Nomads,
    Faction::Imperium,
    Faction::Cartel,
];

/// A faction battle ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// May force a pre-commitment reveal of one category of the opponent's plan.
    Foresight,
    /// May constrain what category of card the opponent plays.
    Compulsion,
    /// May capture a defeated opponent's leader after winning.
    Capture,
    /// Owns the one-time escort token that shields a leader from betrayal.
    Escort,
    /// Fields elite forces that count at the elite strength multiplier.
    EliteForces,
    /// Fields envoy forces that occupy but never fight.
    EnvoyForces,
}

impl Faction {
    /// Returns the lowercase display name of this faction.
    pub const fn name(self) -> &'static str {
        match self {
            Faction::Seers => "seers",
            Faction::Covenant => "covenant",
            Faction::Syndicate => "syndicate",
            Faction::Nomads => "nomads",
            Faction::Imperium => "imperium",
            Faction::Cartel => "cartel",
        }
    }

    /// Returns the abilities held by this faction.
    pub const fn abilities(self) -> &'static [Ability] {
        match self {
            Faction::Seers => &[Ability::Foresight, Ability::Escort],
            Faction::Covenant => &[Ability::Compulsion, Ability::EnvoyForces],
            Faction::Syndicate => &[Ability::Capture],
            Faction::Nomads => &[Ability::EliteForces],
            Faction::Imperium => &[Ability::EliteForces],
            Faction::Cartel => &[],
        }
    }

    /// Returns true if this faction holds the given ability.
    pub fn has(self, ability: Ability) -> bool {
        self.abilities().contains(&ability)
    }

    /// Looks up a faction by its lowercase display name.
    pub fn from_name(name: &str) -> Option<Faction> {
        ALL_FACTIONS.iter().copied().find(|f| f.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip() {
        for f in ALL_FACTIONS {
            assert_eq!(Faction::from_name(f.name()), Some(f));
        }
        assert_eq!(Faction::from_name("atlantis"), None);
    }

    #[test]
    fn indices_are_contiguous() {
        for (i, f) in ALL_FACTIONS.iter().enumerate() {
            assert_eq!(*f as usize, i);
        }
    }

    #[test]
    fn exactly_one_foresight_holder() {
        let holders: Vec<_> = ALL_FACTIONS
            .iter()
            .filter(|f| f.has(Ability::Foresight))
            .collect();
        assert_eq!(holders.len(), 1);
    }

    #[test]
    fn exactly_one_compulsion_holder() {
        let holders: Vec<_> = ALL_FACTIONS
            .iter()
            .filter(|f| f.has(Ability::Compulsion))
            .collect();
        assert_eq!(holders.len(), 1);
    }

    #[test]
    fn cartel_has_no_abilities() {
        assert!(Faction::Cartel.abilities().is_empty());
        assert!(!Faction::Cartel.has(Ability::Capture));
    }

    #[test]
    fn escort_and_foresight_share_an_owner() {
        assert!(Faction::Seers.has(Ability::Escort));
        assert!(Faction::Seers.has(Ability::Foresight));
    }
}
