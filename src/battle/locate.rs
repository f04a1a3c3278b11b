//! Battle location scan.
//!
//! Pure function over the world: finds every territory where two or more
//! factions have combat-capable forces. Envoy-only presence never makes a
//! faction a participant, and a site where every pair of participants is
//! allied produces no battle. Safe to call after every resolved engagement.

use serde::{Deserialize, Serialize};

use crate::world::faction::{Faction, ALL_FACTIONS};
use crate::world::state::WorldState;
use crate::world::territory::{Territory, ALL_TERRITORIES};

/// One territory in contention and its combat-capable participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSite {
    pub territory: Territory,
    pub factions: Vec<Faction>,
}

impl BattleSite {
    /// Returns the factions this participant can actually fight here:
    /// the other participants minus its ally.
    pub fn opponents_of(&self, faction: Faction, world: &WorldState) -> Vec<Faction> {
        if !self.factions.contains(&faction) {
            return Vec::new();
        }
        self.factions
            .iter()
            .copied()
            .filter(|f| *f != faction && !world.allied(faction, *f))
            .collect()
    }
}

/// Scans the world for battles. Each qualifying territory appears exactly
/// once, in map order.
pub fn locate_battles(world: &WorldState) -> Vec<BattleSite> {
    let mut sites = Vec::new();
    for territory in ALL_TERRITORIES {
        let factions: Vec<Faction> = ALL_FACTIONS
            .into_iter()
            .filter(|f| world.stack(territory, *f).combat_capable() > 0)
            .collect();
        if factions.len() < 2 {
            continue;
        }
        let any_hostile_pair = factions.iter().enumerate().any(|(i, a)| {
            factions[i + 1..].iter().any(|b| !world.allied(*a, *b))
        });
        if any_hostile_pair {
            sites.push(BattleSite { territory, factions });
        }
    }
    sites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::forces::ForceKind;

    #[test]
    fn empty_world_has_no_battles() {
        assert!(locate_battles(&WorldState::empty()).is_empty());
    }

    #[test]
    fn lone_occupier_is_not_a_battle() {
        let mut world = WorldState::empty();
        world.place_forces(Territory::Dunes, Faction::Nomads, ForceKind::Regular, 5);
        assert!(locate_battles(&world).is_empty());
    }

    #[test]
    fn two_factions_make_a_battle() {
        let mut world = WorldState::empty();
        world.place_forces(Territory::Dunes, Faction::Nomads, ForceKind::Regular, 5);
        world.place_forces(Territory::Dunes, Faction::Imperium, ForceKind::Elite, 2);
        let sites = locate_battles(&world);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].territory, Territory::Dunes);
        assert_eq!(sites[0].factions, vec![Faction::Nomads, Faction::Imperium]);
    }

    #[test]
    fn envoy_only_presence_is_excluded() {
        let mut world = WorldState::empty();
        world.place_forces(Territory::Harbor, Faction::Cartel, ForceKind::Regular, 3);
        world.place_forces(Territory::Harbor, Faction::Covenant, ForceKind::Envoy, 4);
        assert!(locate_battles(&world).is_empty());

        // A single fighter alongside the envoys flips it into a battle.
        world.place_forces(Territory::Harbor, Faction::Covenant, ForceKind::Regular, 1);
        assert_eq!(locate_battles(&world).len(), 1);
    }

    #[test]
    fn each_territory_listed_once() {
        let mut world = WorldState::empty();
        for t in [Territory::Citadel, Territory::Quarry] {
            world.place_forces(t, Faction::Seers, ForceKind::Regular, 2);
            world.place_forces(t, Faction::Syndicate, ForceKind::Regular, 2);
            world.place_forces(t, Faction::Cartel, ForceKind::Regular, 2);
        }
        let sites = locate_battles(&world);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].factions.len(), 3);
    }

    #[test]
    fn allied_pair_does_not_fight() {
        let mut world = WorldState::empty();
        world.form_alliance(Faction::Seers, Faction::Nomads);
        world.place_forces(Territory::Basin, Faction::Seers, ForceKind::Regular, 2);
        world.place_forces(Territory::Basin, Faction::Nomads, ForceKind::Regular, 2);
        assert!(locate_battles(&world).is_empty());

        // A third, hostile faction restores the battle.
        world.place_forces(Territory::Basin, Faction::Cartel, ForceKind::Regular, 1);
        let sites = locate_battles(&world);
        assert_eq!(sites.len(), 1);
        assert_eq!(
            sites[0].opponents_of(Faction::Seers, &world),
            vec![Faction::Cartel]
        );
    }

    #[test]
    fn opponents_of_non_participant_is_empty() {
        let mut world = WorldState::empty();
        world.place_forces(Territory::Basin, Faction::Seers, ForceKind::Regular, 2);
        world.place_forces(Territory::Basin, Faction::Cartel, ForceKind::Regular, 1);
        let sites = locate_battles(&world);
        assert!(sites[0].opponents_of(Faction::Imperium, &world).is_empty());
    }
}
