//! Outcome application.
//!
//! Translates a resolved [`Outcome`] into world mutations: force attrition,
//! leader deaths and returns, resource settlement, card disposal, escort
//! marking, and the capture opportunity. Every batch runs through
//! `ops::transact`, so a post-mutation invariant breach rolls the whole
//! engagement's mutations back instead of corrupting shared state.

use crate::protocol::Event;
use crate::world::card::CardId;
use crate::world::faction::{Ability, Faction};
use crate::world::leader::{LeaderId, LeaderState};
use crate::world::ops::{self, OpError};
use crate::world::state::WorldState;

use super::combat::{Outcome, Payout};
use super::engagement::{BetrayalCall, Engagement, Side};

/// Resource paid from the pool for destroying a captured leader.
pub const CAPTURE_REWARD: u32 = 2;

/// Applies the immediate consequences of a resolved engagement: attrition,
/// leader fates, resource settlement, forced card discards, and ability
/// marking. The winner's optional discard choice and the capture
/// opportunity run as later sub-phases.
pub fn apply_outcome(
    world: &mut WorldState,
    eng: &Engagement,
    outcome: &Outcome,
) -> Result<Vec<Event>, OpError> {
    let mut events = Vec::new();
    ops::transact(world, |w| {
        if outcome.mutual_destruction {
            apply_mutual_destruction(w, eng, outcome, &mut events)
        } else {
            apply_contested(w, eng, outcome, &mut events)
        }
    })?;
    Ok(events)
}

fn apply_mutual_destruction(
    w: &mut WorldState,
    eng: &Engagement,
    outcome: &Outcome,
    events: &mut Vec<Event>,
) -> Result<(), OpError> {
    for side in [Side::Aggressor, Side::Defender] {
        let so = outcome.side(side);
        let removed = ops::destroy_presence(w, outcome.territory, so.faction);
        if !removed.is_empty() {
            events.push(Event::ForcesDestroyed {
                territory: outcome.territory,
                faction: so.faction,
                regulars: removed.regular,
                elites: removed.elite,
                envoys: removed.envoy,
            });
        }
        if let Some(leader) = so.leader_killed {
            ops::kill_leader(w, leader)?;
            events.push(Event::LeaderKilled { leader });
        }
        for card in &so.cards_to_discard {
            ops::discard_card(w, so.faction, *card)?;
            events.push(Event::CardDiscarded { faction: so.faction, card: *card });
        }
    }
    // The only way the escort token can ever be destroyed.
    let escort_deployed = [Side::Aggressor, Side::Defender]
        .into_iter()
        .filter_map(|s| eng.plan(s))
        .any(|p| p.use_escort);
    if escort_deployed {
        ops::destroy_escort(w);
        events.push(Event::EscortDestroyed);
    }
    release_prisoners(w, events);
    Ok(())
}

fn apply_contested(
    w: &mut WorldState,
    eng: &Engagement,
    outcome: &Outcome,
    events: &mut Vec<Event>,
) -> Result<(), OpError> {
    let Some(winner) = outcome.winner else {
        // A contested outcome always names a winner; resolving without one
        // is itself an invariant breach worth rolling back over.
        return Err(OpError::InvariantBreach("contested outcome without winner".into()));
    };
    let loser = winner.opponent();

    // Loser's entire presence goes first.
    let loser_so = outcome.side(loser);
    let removed = ops::destroy_presence(w, outcome.territory, loser_so.faction);
    if !removed.is_empty() {
        events.push(Event::ForcesDestroyed {
            territory: outcome.territory,
            faction: loser_so.faction,
            regulars: removed.regular,
            elites: removed.elite,
            envoys: removed.envoy,
        });
    }

    // Winner pays its own dial.
    let winner_so = outcome.side(winner);
    if winner_so.regulars_lost > 0 || winner_so.elites_lost > 0 {
        ops::remove_forces(
            w,
            outcome.territory,
            winner_so.faction,
            winner_so.regulars_lost,
            winner_so.elites_lost,
        )?;
        events.push(Event::ForcesDestroyed {
            territory: outcome.territory,
            faction: winner_so.faction,
            regulars: winner_so.regulars_lost,
            elites: winner_so.elites_lost,
            envoys: 0,
        });
    }

    for side in [Side::Aggressor, Side::Defender] {
        if let Some(leader) = outcome.side(side).leader_killed {
            ops::kill_leader(w, leader)?;
            events.push(Event::LeaderKilled { leader });
        }
    }

    let betrayal_win = matches!(eng.betrayal, BetrayalCall::Single { side, .. } if side == winner);

    // Winner's surviving leader: betrayal returns it straight to its
    // owner; a surviving captive also goes home on first use; otherwise
    // it is marked used for the rest of the round.
    if let Some(leader) = eng.plan(winner).and_then(|p| p.leader) {
        if winner_so.leader_killed.is_none() {
            let captive = matches!(
                w.leader_state(leader),
                LeaderState::Captured { by } if by == winner_so.faction
            );
            if betrayal_win || captive {
                ops::return_leader(w, leader)?;
                events.push(Event::LeaderReturned { leader, to: leader.faction() });
            } else {
                ops::mark_leader_used(w, leader)?;
            }
        }
    }

    for payout in &outcome.payouts {
        match *payout {
            Payout::ToPool { faction, amount } => {
                if amount > 0 {
                    ops::pay_to_pool(w, faction, amount)?;
                    events.push(Event::ResourcePaid { faction, amount });
                }
            }
            Payout::Retained { faction, amount } => {
                if amount > 0 {
                    events.push(Event::ResourceRetained { faction, amount });
                }
            }
        }
    }

    for side in [Side::Aggressor, Side::Defender] {
        let so = outcome.side(side);
        for card in &so.cards_to_discard {
            ops::discard_card(w, so.faction, *card)?;
            events.push(Event::CardDiscarded { faction: so.faction, card: *card });
        }
    }

    // One-time abilities consumed by the winner, unless betrayal undoes
    // the consumption.
    if eng.plan(winner).is_some_and(|p| p.use_escort) && !betrayal_win {
        ops::consume_escort(w)?;
        events.push(Event::EscortConsumed);
    }

    if let BetrayalCall::Single { side, declarer } = eng.betrayal {
        if let Some(betrayed) = eng.plan(side.opponent()).and_then(|p| p.leader) {
            ops::spend_traitor_card(w, declarer, betrayed)?;
        }
    }

    release_prisoners(w, events);
    Ok(())
}

fn release_prisoners(w: &mut WorldState, events: &mut Vec<Event>) {
    for leader in ops::release_captives_of_leaderless(w) {
        events.push(Event::LeaderReturned { leader, to: leader.faction() });
    }
}

/// Applies the winner's keep-or-discard choice over its played cards.
/// Anything outside the candidate set is ignored; unnamed candidates are
/// kept.
pub fn apply_discard_choice(
    world: &mut WorldState,
    winner: Faction,
    candidates: &[CardId],
    discard: &[CardId],
) -> Result<Vec<Event>, OpError> {
    let mut events = Vec::new();
    ops::transact(world, |w| {
        for card in candidates {
            if discard.contains(card) {
                ops::discard_card(w, winner, *card)?;
                events.push(Event::CardDiscarded { faction: winner, card: *card });
            } else {
                events.push(Event::CardKept { faction: winner, card: *card });
            }
        }
        Ok(())
    })?;
    Ok(events)
}

/// Returns the leader offered to a capture-capable winner: the loser's
/// strongest leader still alive and free. `None` when no opportunity.
pub fn capture_opportunity(world: &WorldState, outcome: &Outcome) -> Option<LeaderId> {
    if outcome.mutual_destruction {
        return None;
    }
    let winner = outcome.winning_faction()?;
    let loser = outcome.losing_faction()?;
    if !winner.has(Ability::Capture) {
        return None;
    }
    LeaderId::roster(loser)
        .filter(|l| world.leader_state(*l).alive_free())
        .max_by_key(|l| l.strength())
}

/// Applies the winner's capture decision: destroy for the pool reward, or
/// retain the leader in custody.
pub fn apply_capture_choice(
    world: &mut WorldState,
    winner: Faction,
    leader: LeaderId,
    destroy: bool,
) -> Result<Vec<Event>, OpError> {
    let mut events = Vec::new();
    ops::transact(world, |w| {
        if destroy {
            ops::kill_leader(w, leader)?;
            events.push(Event::LeaderKilled { leader });
            let paid = ops::pay_from_pool(w, winner, CAPTURE_REWARD);
            events.push(Event::CaptureReward { faction: winner, amount: paid });
            release_prisoners(w, &mut events);
        } else {
            ops::capture_leader(w, leader, winner)?;
            events.push(Event::LeaderCaptured { leader, by: winner });
        }
        Ok(())
    })?;
    Ok(events)
}
