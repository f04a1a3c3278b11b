//! Betrayal eligibility and classification.
//!
//! After plans reveal, a side may betray the opponent's fielded leader if
//! it (or its non-combatant ally) holds the traitor card matching that
//! leader's original identity. A leader under escort is immune regardless
//! of matching cards.

use crate::world::faction::Faction;
use crate::world::state::WorldState;

use super::engagement::{BetrayalCall, Engagement, Side};

/// Computes who may declare betrayal: for each side, the benefiting
/// combatant side and the faction actually asked to declare (the combatant
/// itself, or its ally holding the card on its behalf).
pub fn betrayal_candidates(world: &WorldState, eng: &Engagement) -> Vec<(Side, Faction)> {
    let mut candidates = Vec::new();
    for side in [Side::Aggressor, Side::Defender] {
        let Some(opponent_plan) = eng.plan(side.opponent()) else {
            continue;
        };
        let Some(leader) = opponent_plan.leader else {
            continue;
        };
        // Escort immunity trumps any matching card.
        if opponent_plan.use_escort {
            continue;
        }
        let combatant = eng.faction(side);
        if world.holds_traitor(combatant, leader) {
            candidates.push((side, combatant));
            continue;
        }
        if let Some(ally) = world.ally_of(combatant) {
            let ally_is_combatant = eng.side_of(ally).is_some();
            if !ally_is_combatant && world.holds_traitor(ally, leader) {
                candidates.push((side, ally));
            }
        }
    }
    candidates
}

/// Classifies the closed declarations into the resolution branch.
pub fn classify(declared: &[(Side, Faction)]) -> BetrayalCall {
    match declared {
        [] => BetrayalCall::None,
        [(side, declarer)] => BetrayalCall::Single { side: *side, declarer: *declarer },
        _ => BetrayalCall::Mutual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::plan::Plan;
    use crate::world::forces::ForceKind;
    use crate::world::leader::{LeaderId, LeaderState};
    use crate::world::territory::Territory;

    const T: Territory = Territory::Citadel;

    fn engagement_with_leaders(
        aggressor_leader: Option<LeaderId>,
        defender_leader: Option<LeaderId>,
    ) -> Engagement {
        let mut eng = Engagement::new(T, Faction::Syndicate, Faction::Seers);
        eng.set_plan(
            Side::Aggressor,
            Plan { leader: aggressor_leader, no_leader_declared: aggressor_leader.is_none(), ..Plan::fallback() },
        );
        eng.set_plan(
            Side::Defender,
            Plan { leader: defender_leader, no_leader_declared: defender_leader.is_none(), ..Plan::fallback() },
        );
        eng
    }

    fn world() -> WorldState {
        let mut world = WorldState::empty();
        world.place_forces(T, Faction::Syndicate, ForceKind::Regular, 3);
        world.place_forces(T, Faction::Seers, ForceKind::Regular, 3);
        world
    }

    #[test]
    fn matching_card_offers_betrayal() {
        let mut world = world();
        world.give_traitor(Faction::Syndicate, LeaderId::Veyra);
        let eng = engagement_with_leaders(Some(LeaderId::Varko), Some(LeaderId::Veyra));
        let candidates = betrayal_candidates(&world, &eng);
        assert_eq!(candidates, vec![(Side::Aggressor, Faction::Syndicate)]);
    }

    #[test]
    fn no_leader_means_no_offer() {
        let mut world = world();
        world.give_traitor(Faction::Syndicate, LeaderId::Veyra);
        let eng = engagement_with_leaders(Some(LeaderId::Varko), None);
        assert!(betrayal_candidates(&world, &eng).is_empty());
    }

    #[test]
    fn card_for_unfielded_leader_is_useless() {
        let mut world = world();
        world.give_traitor(Faction::Syndicate, LeaderId::Odric);
        let eng = engagement_with_leaders(Some(LeaderId::Varko), Some(LeaderId::Veyra));
        assert!(betrayal_candidates(&world, &eng).is_empty());
    }

    #[test]
    fn escort_grants_immunity() {
        let mut world = world();
        world.give_traitor(Faction::Syndicate, LeaderId::Veyra);
        let mut eng = engagement_with_leaders(Some(LeaderId::Varko), Some(LeaderId::Veyra));
        let mut plan = eng.defender_plan.take().expect("plan set");
        plan.use_escort = true;
        eng.set_plan(Side::Defender, plan);
        assert!(betrayal_candidates(&world, &eng).is_empty());
    }

    #[test]
    fn captured_leader_betrayed_via_original_identity() {
        let mut world = world();
        world.give_traitor(Faction::Syndicate, LeaderId::Caius);
        // Caius was captured by the Seers, who now field him.
        world.leaders[LeaderId::Caius as usize] = LeaderState::Captured { by: Faction::Seers };
        let eng = engagement_with_leaders(Some(LeaderId::Varko), Some(LeaderId::Caius));
        let candidates = betrayal_candidates(&world, &eng);
        assert_eq!(candidates, vec![(Side::Aggressor, Faction::Syndicate)]);
    }

    #[test]
    fn ally_declares_on_behalf_of_combatant() {
        let mut world = world();
        world.form_alliance(Faction::Syndicate, Faction::Cartel);
        world.give_traitor(Faction::Cartel, LeaderId::Veyra);
        let eng = engagement_with_leaders(Some(LeaderId::Varko), Some(LeaderId::Veyra));
        let candidates = betrayal_candidates(&world, &eng);
        assert_eq!(candidates, vec![(Side::Aggressor, Faction::Cartel)]);
    }

    #[test]
    fn combatant_ally_cannot_declare_for_its_partner() {
        // If the ally is itself a combatant it declares only for itself.
        let mut world = world();
        world.form_alliance(Faction::Syndicate, Faction::Seers);
        world.give_traitor(Faction::Seers, LeaderId::Veyra);
        let eng = engagement_with_leaders(Some(LeaderId::Varko), Some(LeaderId::Veyra));
        // Seers hold the card matching their own fielded leader; that card
        // benefits the aggressor only if the Syndicate's ally held it while
        // staying out of the fight. Here the ally is the defender itself.
        assert!(betrayal_candidates(&world, &eng).is_empty());
    }

    #[test]
    fn both_sides_can_be_eligible() {
        let mut world = world();
        world.give_traitor(Faction::Syndicate, LeaderId::Veyra);
        world.give_traitor(Faction::Seers, LeaderId::Varko);
        let eng = engagement_with_leaders(Some(LeaderId::Varko), Some(LeaderId::Veyra));
        let candidates = betrayal_candidates(&world, &eng);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn classification_branches() {
        assert_eq!(classify(&[]), BetrayalCall::None);
        assert_eq!(
            classify(&[(Side::Defender, Faction::Seers)]),
            BetrayalCall::Single { side: Side::Defender, declarer: Faction::Seers }
        );
        assert_eq!(
            classify(&[
                (Side::Aggressor, Faction::Syndicate),
                (Side::Defender, Faction::Seers)
            ]),
            BetrayalCall::Mutual
        );
    }
}
