//! World-state mutation library.
//!
//! Every operation the battle core needs to change the world goes through
//! here and returns a `Result`, so an impossible transfer surfaces as a
//! typed error instead of silently corrupting state. `transact` wraps a
//! batch of operations with post-mutation invariant validation: on any
//! breach the original world is kept and the whole batch is discarded.

use thiserror::Error;

use super::card::CardId;
use super::faction::{Faction, ALL_FACTIONS};
use super::forces::{ForceStack, MAX_STACK};
use super::leader::{LeaderId, LeaderState, ALL_LEADERS};
use super::state::WorldState;
use super::territory::Territory;

/// Errors raised by world mutations.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("removing {requested} {kind} forces but only {present} present")]
    InsufficientForces { kind: &'static str, requested: u8, present: u8 },

    #[error("paying {requested} resource but balance is {balance}")]
    InsufficientResource { requested: u32, balance: u32 },

    #[error("{faction} does not hold card {card:?}")]
    CardNotHeld { faction: &'static str, card: CardId },

    #[error("{holder} holds no traitor card for {subject:?}")]
    TraitorCardNotHeld { holder: &'static str, subject: LeaderId },

    #[error("leader {leader:?} is not in state {expected}")]
    WrongLeaderState { leader: LeaderId, expected: &'static str },

    #[error("escort token is not available")]
    EscortUnavailable,

    #[error("post-mutation invariant breach: {0}")]
    InvariantBreach(String),
}

/// A violated world invariant found by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breach(pub String);

impl std::fmt::Display for Breach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks the world invariants that every mutation batch must preserve.
pub fn validate(world: &WorldState) -> Vec<Breach> {
    let mut breaches = Vec::new();

    for territory in super::territory::ALL_TERRITORIES {
        for faction in ALL_FACTIONS {
            let stack = world.stack(territory, faction);
            for (kind, count) in [
                ("regular", stack.regular),
                ("elite", stack.elite),
                ("envoy", stack.envoy),
            ] {
                if count > MAX_STACK {
                    breaches.push(Breach(format!(
                        "{} has {count} {kind} forces at {} (max {MAX_STACK})",
                        faction.name(),
                        territory.name(),
                    )));
                }
            }
        }
    }

    for leader in ALL_LEADERS {
        if let LeaderState::Captured { by } = world.leader_state(leader) {
            if by == leader.faction() {
                breaches.push(Breach(format!(
                    "{leader:?} is recorded as captured by its own faction"
                )));
            }
        }
    }

    if world.escort.destroyed && world.escort.available {
        breaches.push(Breach("escort token is both destroyed and available".into()));
    }

    breaches
}

/// Runs a batch of mutations against a draft world and commits only if all
/// operations succeed and the invariants still hold.
pub fn transact<F>(world: &mut WorldState, batch: F) -> Result<(), OpError>
where
    F: FnOnce(&mut WorldState) -> Result<(), OpError>,
{
    let mut draft = world.clone();
    batch(&mut draft)?;
    let breaches = validate(&draft);
    if let Some(first) = breaches.first() {
        tracing::error!(breach = %first, total = breaches.len(), "rolling back mutation batch");
        return Err(OpError::InvariantBreach(first.to_string()));
    }
    *world = draft;
    Ok(())
}

/// Removes forces from a stack: `regulars` regular and `elites` elite.
pub fn remove_forces(
    world: &mut WorldState,
    territory: Territory,
    faction: Faction,
    regulars: u8,
    elites: u8,
) -> Result<(), OpError> {
    let stack = world.stack_mut(territory, faction);
    if regulars > stack.regular {
        return Err(OpError::InsufficientForces {
            kind: "regular",
            requested: regulars,
            present: stack.regular,
        });
    }
    if elites > stack.elite {
        return Err(OpError::InsufficientForces {
            kind: "elite",
            requested: elites,
            present: stack.elite,
        });
    }
    stack.regular -= regulars;
    stack.elite -= elites;
    Ok(())
}

/// Destroys a faction's entire presence at a territory, envoys included.
/// Returns the stack that was removed.
pub fn destroy_presence(
    world: &mut WorldState,
    territory: Territory,
    faction: Faction,
) -> ForceStack {
    std::mem::take(world.stack_mut(territory, faction))
}

/// Pays resource from a faction into the common pool.
pub fn pay_to_pool(world: &mut WorldState, faction: Faction, amount: u32) -> Result<(), OpError> {
    let balance = world.resources[faction as usize];
    if amount > balance {
        return Err(OpError::InsufficientResource { requested: amount, balance });
    }
    world.resources[faction as usize] = balance - amount;
    world.pool += amount;
    Ok(())
}

/// Pays resource from the common pool to a faction, capped by what the
/// pool holds. Returns the amount actually paid.
pub fn pay_from_pool(world: &mut WorldState, faction: Faction, amount: u32) -> u32 {
    let paid = amount.min(world.pool);
    world.pool -= paid;
    world.resources[faction as usize] += paid;
    paid
}

/// Kills a leader from any live state. Dead leaders rest in the tanks of
/// their original faction regardless of who held them last.
pub fn kill_leader(world: &mut WorldState, leader: LeaderId) -> Result<(), OpError> {
    if world.leader_state(leader) == LeaderState::Dead {
        return Err(OpError::WrongLeaderState { leader, expected: "alive" });
    }
    world.leaders[leader as usize] = LeaderState::Dead;
    Ok(())
}

/// Marks an available leader as used this round.
pub fn mark_leader_used(world: &mut WorldState, leader: LeaderId) -> Result<(), OpError> {
    if world.leader_state(leader) != LeaderState::Available {
        return Err(OpError::WrongLeaderState { leader, expected: "available" });
    }
    world.leaders[leader as usize] = LeaderState::Used;
    Ok(())
}

/// Returns a leader to its original faction's available pool.
pub fn return_leader(world: &mut WorldState, leader: LeaderId) -> Result<(), OpError> {
    if world.leader_state(leader) == LeaderState::Dead {
        return Err(OpError::WrongLeaderState { leader, expected: "alive" });
    }
    world.leaders[leader as usize] = LeaderState::Available;
    Ok(())
}

/// Moves a leader into a captor's custody.
pub fn capture_leader(
    world: &mut WorldState,
    leader: LeaderId,
    by: Faction,
) -> Result<(), OpError> {
    if !world.leader_state(leader).alive_free() {
        return Err(OpError::WrongLeaderState { leader, expected: "alive and free" });
    }
    world.leaders[leader as usize] = LeaderState::Captured { by };
    Ok(())
}

/// Releases every captive whose captor no longer has a living, uncaptured
/// leader of its own. Returns the released leaders.
pub fn release_captives_of_leaderless(world: &mut WorldState) -> Vec<LeaderId> {
    let mut released = Vec::new();
    for captor in ALL_FACTIONS {
        let leaderless = LeaderId::roster(captor)
            .all(|l| !world.leader_state(l).alive_free());
        if !leaderless {
            continue;
        }
        for leader in ALL_LEADERS {
            if world.leader_state(leader) == (LeaderState::Captured { by: captor }) {
                world.leaders[leader as usize] = LeaderState::Available;
                released.push(leader);
            }
        }
    }
    released
}

/// Moves one copy of a card from a faction's hand to the discard pile.
pub fn discard_card(world: &mut WorldState, faction: Faction, card: CardId) -> Result<(), OpError> {
    let hand = &mut world.hands[faction as usize];
    let Some(pos) = hand.iter().position(|c| *c == card) else {
        return Err(OpError::CardNotHeld { faction: faction.name(), card });
    };
    hand.remove(pos);
    world.discards.push(card);
    Ok(())
}

/// Removes a spent traitor card from play.
pub fn spend_traitor_card(
    world: &mut WorldState,
    holder: Faction,
    subject: LeaderId,
) -> Result<(), OpError> {
    let Some(pos) = world
        .traitor_cards
        .iter()
        .position(|t| t.held_by == holder && t.subject == subject)
    else {
        return Err(OpError::TraitorCardNotHeld { holder: holder.name(), subject });
    };
    world.traitor_cards.remove(pos);
    Ok(())
}

/// Marks the escort token consumed.
pub fn consume_escort(world: &mut WorldState) -> Result<(), OpError> {
    if !world.escort.available || world.escort.destroyed {
        return Err(OpError::EscortUnavailable);
    }
    world.escort.available = false;
    Ok(())
}

/// Destroys the escort token outright. Only catastrophic destruction while
/// the escort is deployed reaches this.
pub fn destroy_escort(world: &mut WorldState) {
    world.escort.available = false;
    world.escort.destroyed = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::forces::ForceKind;

    fn world_with_forces() -> WorldState {
        let mut world = WorldState::empty();
        world.place_forces(Territory::Basin, Faction::Cartel, ForceKind::Regular, 5);
        world.place_forces(Territory::Basin, Faction::Cartel, ForceKind::Elite, 2);
        world.place_forces(Territory::Basin, Faction::Cartel, ForceKind::Envoy, 1);
        world
    }

    #[test]
    fn remove_forces_bounds_checked() {
        let mut world = world_with_forces();
        assert!(remove_forces(&mut world, Territory::Basin, Faction::Cartel, 3, 1).is_ok());
        let stack = world.stack(Territory::Basin, Faction::Cartel);
        assert_eq!((stack.regular, stack.elite), (2, 1));

        let err = remove_forces(&mut world, Territory::Basin, Faction::Cartel, 5, 0);
        assert!(matches!(err, Err(OpError::InsufficientForces { .. })));
    }

    #[test]
    fn destroy_presence_takes_everything() {
        let mut world = world_with_forces();
        let removed = destroy_presence(&mut world, Territory::Basin, Faction::Cartel);
        assert_eq!((removed.regular, removed.elite, removed.envoy), (5, 2, 1));
        assert!(world.stack(Territory::Basin, Faction::Cartel).is_empty());
    }

    #[test]
    fn pool_payments_conserve() {
        let mut world = WorldState::empty();
        world.set_resource(Faction::Nomads, 10);
        let pool_before = world.pool;
        pay_to_pool(&mut world, Faction::Nomads, 4).unwrap();
        assert_eq!(world.resources[Faction::Nomads as usize], 6);
        assert_eq!(world.pool, pool_before + 4);

        let err = pay_to_pool(&mut world, Faction::Nomads, 100);
        assert!(matches!(err, Err(OpError::InsufficientResource { .. })));
    }

    #[test]
    fn pool_payout_is_capped() {
        let mut world = WorldState::empty();
        world.pool = 1;
        assert_eq!(pay_from_pool(&mut world, Faction::Seers, 2), 1);
        assert_eq!(world.pool, 0);
        assert_eq!(world.resources[Faction::Seers as usize], 1);
    }

    #[test]
    fn leader_lifecycle_transitions() {
        let mut world = WorldState::empty();
        mark_leader_used(&mut world, LeaderId::Soren).unwrap();
        assert_eq!(world.leader_state(LeaderId::Soren), LeaderState::Used);
        assert!(mark_leader_used(&mut world, LeaderId::Soren).is_err());

        return_leader(&mut world, LeaderId::Soren).unwrap();
        assert_eq!(world.leader_state(LeaderId::Soren), LeaderState::Available);

        kill_leader(&mut world, LeaderId::Soren).unwrap();
        assert_eq!(world.leader_state(LeaderId::Soren), LeaderState::Dead);
        assert!(kill_leader(&mut world, LeaderId::Soren).is_err());
        assert!(return_leader(&mut world, LeaderId::Soren).is_err());
    }

    #[test]
    fn captured_leader_dies_to_original_tanks() {
        let mut world = WorldState::empty();
        capture_leader(&mut world, LeaderId::Caius, Faction::Syndicate).unwrap();
        kill_leader(&mut world, LeaderId::Caius).unwrap();
        // Dead state carries no captor; the original faction is in the id.
        assert_eq!(world.leader_state(LeaderId::Caius), LeaderState::Dead);
        assert_eq!(LeaderId::Caius.faction(), Faction::Imperium);
    }

    #[test]
    fn prison_break_releases_captives() {
        let mut world = WorldState::empty();
        capture_leader(&mut world, LeaderId::Caius, Faction::Syndicate).unwrap();
        assert!(release_captives_of_leaderless(&mut world).is_empty());

        for leader in LeaderId::roster(Faction::Syndicate) {
            kill_leader(&mut world, leader).unwrap();
        }
        let released = release_captives_of_leaderless(&mut world);
        assert_eq!(released, vec![LeaderId::Caius]);
        assert_eq!(world.leader_state(LeaderId::Caius), LeaderState::Available);
    }

    #[test]
    fn discard_requires_holding() {
        let mut world = WorldState::empty();
        world.give_card(Faction::Seers, CardId::Philter);
        discard_card(&mut world, Faction::Seers, CardId::Philter).unwrap();
        assert_eq!(world.discards, vec![CardId::Philter]);
        assert!(discard_card(&mut world, Faction::Seers, CardId::Philter).is_err());
    }

    #[test]
    fn spend_traitor_card_removes_one() {
        let mut world = WorldState::empty();
        world.give_traitor(Faction::Syndicate, LeaderId::Veyra);
        spend_traitor_card(&mut world, Faction::Syndicate, LeaderId::Veyra).unwrap();
        assert!(world.traitor_cards.is_empty());
        assert!(spend_traitor_card(&mut world, Faction::Syndicate, LeaderId::Veyra).is_err());
    }

    #[test]
    fn escort_consume_and_destroy() {
        let mut world = WorldState::empty();
        consume_escort(&mut world).unwrap();
        assert!(!world.escort.available);
        assert!(consume_escort(&mut world).is_err());

        destroy_escort(&mut world);
        assert!(world.escort.destroyed);
    }

    #[test]
    fn transact_commits_on_success() {
        let mut world = world_with_forces();
        transact(&mut world, |w| {
            remove_forces(w, Territory::Basin, Faction::Cartel, 2, 0)
        })
        .unwrap();
        assert_eq!(world.stack(Territory::Basin, Faction::Cartel).regular, 3);
    }

    #[test]
    fn transact_rolls_back_on_op_error() {
        let mut world = world_with_forces();
        let before = world.clone();
        let result = transact(&mut world, |w| {
            remove_forces(w, Territory::Basin, Faction::Cartel, 2, 0)?;
            remove_forces(w, Territory::Basin, Faction::Cartel, 10, 0)
        });
        assert!(result.is_err());
        assert_eq!(world, before);
    }

    #[test]
    fn transact_rolls_back_on_invariant_breach() {
        let mut world = WorldState::empty();
        let before = world.clone();
        let result = transact(&mut world, |w| {
            w.stack_mut(Territory::Dunes, Faction::Nomads).regular = MAX_STACK + 1;
            Ok(())
        });
        assert!(matches!(result, Err(OpError::InvariantBreach(_))));
        assert_eq!(world, before);
    }

    #[test]
    fn validate_flags_self_capture() {
        let mut world = WorldState::empty();
        world.leaders[LeaderId::Varko as usize] =
            LeaderState::Captured { by: Faction::Syndicate };
        assert_eq!(validate(&world).len(), 1);
    }
}
