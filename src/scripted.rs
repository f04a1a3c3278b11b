//! A seeded scripted agent for tests, benches, and the demo binary.
//!
//! Answers any request with a random legal choice, so a full battle round
//! can run unattended and reproducibly from a seed.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::battle::{BattleRound, CardConstraint, Commitment, Plan, QueryCategory};
use crate::protocol::{Event, Request, RequestContext, Response, ResponseData};
use crate::world::{
    CardId, DefenseKind, Faction, ForceKind, LeaderId, Territory, WeaponKind, WorldState,
};

/// Upper bound on engine steps per round. A round always terminates long
/// before this; the bound caps the damage of a controller bug.
const MAX_STEPS: usize = 10_000;

/// A random-legal-choice agent with a deterministic seed.
pub struct ScriptedAgent {
    rng: SmallRng,
}

impl ScriptedAgent {
    /// Creates an agent whose choices are fully determined by the seed.
    pub fn new(seed: u64) -> Self {
        ScriptedAgent { rng: SmallRng::seed_from_u64(seed) }
    }

    /// Answers one request with a random legal response.
    pub fn respond(&mut self, request: &Request, world: &WorldState) -> Response {
        let faction = request.faction;
        match &request.context {
            RequestContext::ChooseEngagement { options } => match options.choose(&mut self.rng)
            {
                Some(option) => Response::answer(
                    faction,
                    ResponseData::ChooseEngagement {
                        territory: option.territory,
                        opponent: option.opponent,
                    },
                ),
                None => Response::pass(faction),
            },
            RequestContext::UseCompulsion { .. } => {
                if self.rng.gen_bool(0.5) {
                    Response::answer(
                        faction,
                        ResponseData::UseCompulsion {
                            must: self.rng.gen_bool(0.5),
                            constraint: self.random_constraint(),
                        },
                    )
                } else {
                    Response::pass(faction)
                }
            }
            RequestContext::UseQuery { categories, .. } => {
                match categories.choose(&mut self.rng) {
                    Some(category) if self.rng.gen_bool(0.5) => {
                        Response::answer(faction, ResponseData::UseQuery { category: *category })
                    }
                    _ => Response::pass(faction),
                }
            }
            RequestContext::RevealQueryElement { category } => Response::answer(
                faction,
                ResponseData::Reveal {
                    commitment: self.achievable_commitment(world, faction, *category),
                },
            ),
            RequestContext::CreatePlan { territory, commitment, .. } => Response::answer(
                faction,
                ResponseData::Plan {
                    plan: self.random_plan(world, faction, *territory, commitment.as_ref()),
                },
            ),
            RequestContext::DeclareBetrayal { .. } => {
                if self.rng.gen_bool(0.5) {
                    Response::answer(faction, ResponseData::Betray)
                } else {
                    Response::pass(faction)
                }
            }
            RequestContext::ChooseCardsToDiscard { candidates } => {
                let cards = candidates
                    .iter()
                    .copied()
                    .filter(|_| self.rng.gen_bool(0.5))
                    .collect();
                Response::answer(faction, ResponseData::Discard { cards })
            }
            RequestContext::CaptureChoice { .. } => Response::answer(
                faction,
                ResponseData::Capture { destroy: self.rng.gen_bool(0.5) },
            ),
        }
    }

    fn random_constraint(&mut self) -> CardConstraint {
        let constraints = [
            CardConstraint::Weapon(WeaponKind::Kinetic),
            CardConstraint::Weapon(WeaponKind::Toxin),
            CardConstraint::Defense(DefenseKind::Barrier),
            CardConstraint::Defense(DefenseKind::Antidote),
        ];
        constraints[self.rng.gen_range(0..constraints.len())]
    }

    /// Declares a commitment the faction can actually honor at planning
    /// time, so the later plan passes validation against it.
    fn achievable_commitment(
        &mut self,
        world: &WorldState,
        faction: Faction,
        category: QueryCategory,
    ) -> Commitment {
        match category {
            QueryCategory::Leader => {
                Commitment::Leader(world.eligible_leaders(faction).choose(&mut self.rng).copied())
            }
            QueryCategory::OffensiveCard => {
                Commitment::OffensiveCard(self.random_held(world, faction, true))
            }
            QueryCategory::DefensiveCard => {
                Commitment::DefensiveCard(self.random_held(world, faction, false))
            }
            QueryCategory::CommittedStrength => Commitment::CommittedStrength {
                forces: 0,
                resource: self.rng.gen_range(0..=world.resources[faction as usize].min(2)),
            },
        }
    }

    fn random_held(&mut self, world: &WorldState, faction: Faction, weapon: bool) -> Option<CardId> {
        let held: Vec<CardId> = world.hands[faction as usize]
            .iter()
            .copied()
            .filter(|c| if weapon { c.weapon().is_some() } else { c.defense().is_some() })
            .collect();
        if self.rng.gen_bool(0.5) {
            held.choose(&mut self.rng).copied()
        } else {
            None
        }
    }

    /// Builds a legal plan, honoring a binding commitment exactly.
    fn random_plan(
        &mut self,
        world: &WorldState,
        faction: Faction,
        territory: Territory,
        commitment: Option<&Commitment>,
    ) -> Plan {
        let stack = *world.stack(territory, faction);
        let mut plan = Plan::fallback();

        plan.leader = world.eligible_leaders(faction).choose(&mut self.rng).copied();
        plan.regulars_committed = self.rng.gen_range(0..=stack.regular);
        plan.elites_committed = self.rng.gen_range(0..=stack.elite);
        plan.resource_committed =
            self.rng.gen_range(0..=world.resources[faction as usize].min(3));
        plan.offensive_card = self.random_held(world, faction, true);
        plan.defensive_card = self.random_held(world, faction, false);

        match commitment {
            Some(Commitment::Leader(declared)) => plan.leader = *declared,
            Some(Commitment::OffensiveCard(declared)) => plan.offensive_card = *declared,
            Some(Commitment::DefensiveCard(declared)) => plan.defensive_card = *declared,
            Some(Commitment::CommittedStrength { forces, resource }) => {
                plan.regulars_committed = (*forces).min(stack.regular);
                plan.elites_committed = (*forces - plan.regulars_committed).min(stack.elite);
                plan.resource_committed = *resource;
            }
            None => {}
        }
        plan.no_leader_declared = plan.leader.is_none();

        let escort = &world.escort;
        if escort.owner == faction
            && escort.available
            && !escort.destroyed
            && plan.leader.is_some()
            && self.rng.gen_bool(0.3)
        {
            plan.use_escort = true;
        }
        plan
    }
}

/// Runs one battle phase to completion with a scripted agent answering
/// every request. Returns the full event stream.
pub fn run_round(world: &mut WorldState, order: Vec<Faction>, seed: u64) -> Vec<Event> {
    let mut agent = ScriptedAgent::new(seed);
    let mut round = BattleRound::new(world, order);
    let mut events = Vec::new();
    let mut responses: Vec<Response> = Vec::new();
    for _ in 0..MAX_STEPS {
        let result = round.advance(world, &responses);
        events.extend(result.events);
        if result.complete {
            break;
        }
        responses = result
            .pending
            .iter()
            .map(|request| agent.respond(request, world))
            .collect();
    }
    events
}

/// Seeds a small contested world for the demo binary and the bench.
pub fn demo_world() -> WorldState {
    let mut world = WorldState::empty();

    world.place_forces(Territory::Citadel, Faction::Imperium, ForceKind::Regular, 4);
    world.place_forces(Territory::Citadel, Faction::Imperium, ForceKind::Elite, 2);
    world.place_forces(Territory::Citadel, Faction::Syndicate, ForceKind::Regular, 5);
    world.place_forces(Territory::Harbor, Faction::Cartel, ForceKind::Regular, 6);
    world.place_forces(Territory::Harbor, Faction::Seers, ForceKind::Regular, 4);
    world.place_forces(Territory::Oasis, Faction::Nomads, ForceKind::Elite, 3);
    world.place_forces(Territory::Oasis, Faction::Covenant, ForceKind::Regular, 3);
    world.place_forces(Territory::Oasis, Faction::Covenant, ForceKind::Envoy, 1);

    for faction in crate::world::ALL_FACTIONS {
        world.set_resource(faction, 6);
    }

    world.give_card(Faction::Imperium, CardId::Slugthrower);
    world.give_card(Faction::Imperium, CardId::AegisField);
    world.give_card(Faction::Syndicate, CardId::VenomNeedle);
    world.give_card(Faction::Syndicate, CardId::Counteragent);
    world.give_card(Faction::Cartel, CardId::Arclance);
    world.give_card(Faction::Seers, CardId::DeflectorWeb);
    world.give_card(Faction::Covenant, CardId::Duskpowder);
    world.give_card(Faction::Nomads, CardId::Philter);

    world.give_traitor(Faction::Syndicate, LeaderId::Caius);
    world.give_traitor(Faction::Cartel, LeaderId::Odric);
    world.give_traitor(Faction::Covenant, LeaderId::Asha);

    world
}

/// The demo engagement order, strongest claim first.
pub fn demo_order() -> Vec<Faction> {
    vec![
        Faction::Imperium,
        Faction::Syndicate,
        Faction::Cartel,
        Faction::Seers,
        Faction::Covenant,
        Faction::Nomads,
    ]
}
