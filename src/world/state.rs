//! World-state snapshot.
//!
//! Holds everything the battle core reads: per-territory force stacks,
//! resource balances, leader lifecycle states, card hands, traitor cards,
//! alliances, and the escort token. Mutation goes through `world::ops`;
//! the setters here are setup helpers for tests and scenario builders.

use serde::{Deserialize, Serialize};

use super::card::{CardId, TraitorCard};
use super::faction::{Faction, FACTION_COUNT};
use super::forces::{ForceKind, ForceStack};
use super::leader::{LeaderId, LeaderState, LEADER_COUNT};
use super::territory::{Territory, TERRITORY_COUNT};

/// Opening balance of the common pool.
pub const STARTING_POOL: u32 = 100;

/// State of the one-time escort token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscortState {
    pub owner: Faction,
    /// Consumed escorts become unavailable but still exist.
    pub available: bool,
    /// Destroyed escorts are gone for good. Only catastrophic destruction
    /// while the escort is deployed can set this.
    pub destroyed: bool,
}

/// Complete world state at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Force stacks indexed by `[Territory as usize][Faction as usize]`.
    pub forces: [[ForceStack; FACTION_COUNT]; TERRITORY_COUNT],
    /// Spendable resource balance per faction.
    pub resources: [u32; FACTION_COUNT],
    /// The common pool battle commitments are paid into.
    pub pool: u32,
    /// Leader lifecycle, indexed by `LeaderId as usize`.
    pub leaders: [LeaderState; LEADER_COUNT],
    /// Combat cards held per faction.
    pub hands: [Vec<CardId>; FACTION_COUNT],
    /// Discard pile for spent combat cards.
    pub discards: Vec<CardId>,
    /// Traitor-matching cards in play.
    pub traitor_cards: Vec<TraitorCard>,
    /// Symmetric alliance links.
    pub allies: [Option<Faction>; FACTION_COUNT],
    /// The one-time escort token.
    pub escort: EscortState,
}

impl WorldState {
    /// Creates an empty world: no forces, no cards, all leaders available.
    pub fn empty() -> Self {
        WorldState {
            forces: [[ForceStack::default(); FACTION_COUNT]; TERRITORY_COUNT],
            resources: [0; FACTION_COUNT],
            pool: STARTING_POOL,
            leaders: [LeaderState::Available; LEADER_COUNT],
            hands: std::array::from_fn(|_| Vec::new()),
            discards: Vec::new(),
            traitor_cards: Vec::new(),
            allies: [None; FACTION_COUNT],
            escort: EscortState { owner: Faction::Seers, available: true, destroyed: false },
        }
    }

    /// Returns the force stack for a faction at a territory.
    pub fn stack(&self, territory: Territory, faction: Faction) -> &ForceStack {
        &self.forces[territory as usize][faction as usize]
    }

    /// Returns the mutable force stack for a faction at a territory.
    pub fn stack_mut(&mut self, territory: Territory, faction: Faction) -> &mut ForceStack {
        &mut self.forces[territory as usize][faction as usize]
    }

    /// Places forces during setup.
    pub fn place_forces(
        &mut self,
        territory: Territory,
        faction: Faction,
        kind: ForceKind,
        count: u8,
    ) {
        *self.stack_mut(territory, faction).count_mut(kind) += count;
    }

    /// Sets a faction's resource balance during setup.
    pub fn set_resource(&mut self, faction: Faction, amount: u32) {
        self.resources[faction as usize] = amount;
    }

    /// Deals a combat card to a faction's hand.
    pub fn give_card(&mut self, faction: Faction, card: CardId) {
        self.hands[faction as usize].push(card);
    }

    /// Deals a traitor-matching card.
    pub fn give_traitor(&mut self, holder: Faction, subject: LeaderId) {
        self.traitor_cards.push(TraitorCard { subject, held_by: holder });
    }

    /// Forms a symmetric alliance between two factions.
    pub fn form_alliance(&mut self, a: Faction, b: Faction) {
        self.allies[a as usize] = Some(b);
        self.allies[b as usize] = Some(a);
    }

    /// Returns a faction's ally, if any.
    pub fn ally_of(&self, faction: Faction) -> Option<Faction> {
        self.allies[faction as usize]
    }

    /// Returns true if the two factions are allied.
    pub fn allied(&self, a: Faction, b: Faction) -> bool {
        self.ally_of(a) == Some(b)
    }

    /// Returns the lifecycle state of a leader.
    pub fn leader_state(&self, leader: LeaderId) -> LeaderState {
        self.leaders[leader as usize]
    }

    /// Returns true if a faction holds at least one copy of a card.
    pub fn holds_card(&self, faction: Faction, card: CardId) -> bool {
        self.hands[faction as usize].contains(&card)
    }

    /// Returns the leaders a faction may commit to a battle: its own
    /// available leaders plus any leaders it holds captive.
    pub fn eligible_leaders(&self, faction: Faction) -> Vec<LeaderId> {
        use super::leader::ALL_LEADERS;
        ALL_LEADERS
            .into_iter()
            .filter(|l| match self.leader_state(*l) {
                LeaderState::Available => l.faction() == faction,
                LeaderState::Captured { by } => by == faction,
                LeaderState::Used | LeaderState::Dead => false,
            })
            .collect()
    }

    /// Returns true if a faction holds the traitor card matching a leader.
    pub fn holds_traitor(&self, faction: Faction, subject: LeaderId) -> bool {
        self.traitor_cards
            .iter()
            .any(|t| t.held_by == faction && t.subject == subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_world_has_no_forces() {
        let world = WorldState::empty();
        for row in &world.forces {
            for stack in row {
                assert!(stack.is_empty());
            }
        }
        assert_eq!(world.pool, STARTING_POOL);
    }

    #[test]
    fn place_and_read_forces() {
        let mut world = WorldState::empty();
        world.place_forces(Territory::Citadel, Faction::Nomads, ForceKind::Elite, 3);
        world.place_forces(Territory::Citadel, Faction::Nomads, ForceKind::Regular, 2);
        let stack = world.stack(Territory::Citadel, Faction::Nomads);
        assert_eq!(stack.elite, 3);
        assert_eq!(stack.regular, 2);
        assert_eq!(stack.combat_capable(), 5);
    }

    #[test]
    fn alliance_is_symmetric() {
        let mut world = WorldState::empty();
        world.form_alliance(Faction::Seers, Faction::Nomads);
        assert!(world.allied(Faction::Seers, Faction::Nomads));
        assert!(world.allied(Faction::Nomads, Faction::Seers));
        assert!(!world.allied(Faction::Seers, Faction::Cartel));
    }

    #[test]
    fn eligible_leaders_track_state() {
        let mut world = WorldState::empty();
        let own = world.eligible_leaders(Faction::Cartel);
        assert_eq!(own.len(), 5);

        world.leaders[LeaderId::Soren as usize] = LeaderState::Dead;
        world.leaders[LeaderId::Edda as usize] = LeaderState::Used;
        assert_eq!(world.eligible_leaders(Faction::Cartel).len(), 3);
    }

    #[test]
    fn captive_is_eligible_for_captor_only() {
        let mut world = WorldState::empty();
        world.leaders[LeaderId::Caius as usize] =
            LeaderState::Captured { by: Faction::Syndicate };
        assert!(world.eligible_leaders(Faction::Syndicate).contains(&LeaderId::Caius));
        assert!(!world.eligible_leaders(Faction::Imperium).contains(&LeaderId::Caius));
    }

    #[test]
    fn traitor_lookup() {
        let mut world = WorldState::empty();
        world.give_traitor(Faction::Syndicate, LeaderId::Veyra);
        assert!(world.holds_traitor(Faction::Syndicate, LeaderId::Veyra));
        assert!(!world.holds_traitor(Faction::Seers, LeaderId::Veyra));
    }
}
