//! The battle-phase loop.
//!
//! [`BattleRound`] owns the phase's whole lifecycle: walking the
//! engagement order, offering each aggressor its choice of battles,
//! driving one engagement at a time through its sub-phases, and declaring
//! the phase complete when the order is exhausted or no battles remain.
//! The engine never blocks: `advance` applies whatever responses the
//! caller brought, runs until it needs another decision, and returns the
//! requests it is suspended on.

use tracing::{debug, warn};

use crate::protocol::{
    EngagementOption, Event, PhaseId, Request, RequestContext, RequestKind, Response,
    ResponseData, StepResult,
};
use crate::world::faction::{Ability, Faction};
use crate::world::state::WorldState;
use crate::world::territory::Territory;

use super::betrayal::{betrayal_candidates, classify};
use super::combat::resolve;
use super::consequence::{
    apply_capture_choice, apply_discard_choice, apply_outcome, capture_opportunity,
    CAPTURE_REWARD,
};
use super::engagement::{
    BetrayalCall, Commitment, CompulsionCommand, Engagement, Side, SubPhase,
    ALL_QUERY_CATEGORIES,
};
use super::locate::{locate_battles, BattleSite};
use super::plan::{validate_plan, complies_with, Plan};

/// One battle phase in progress.
#[derive(Debug, Clone)]
pub struct BattleRound {
    /// Engagement order for the round, strongest claim first.
    order: Vec<Faction>,
    /// Index of the faction currently being offered engagements.
    order_idx: usize,
    worklist: Vec<BattleSite>,
    engagement: Option<Engagement>,
    pending: Vec<Request>,
    simultaneous: bool,
    /// After an engagement resolves, the same aggressor must finish its
    /// battles at that territory before choosing elsewhere.
    reoffer: Option<(Faction, Territory)>,
    complete: bool,
}

impl BattleRound {
    /// Starts a battle phase over the current world with the given
    /// engagement order.
    pub fn new(world: &WorldState, order: Vec<Faction>) -> Self {
        BattleRound {
            order,
            order_idx: 0,
            worklist: locate_battles(world),
            engagement: None,
            pending: Vec::new(),
            simultaneous: false,
            reoffer: None,
            complete: false,
        }
    }

    /// Returns the requests the round is currently suspended on.
    pub fn pending(&self) -> &[Request] {
        &self.pending
    }

    /// Returns true once the phase has fully resolved.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Applies the caller's responses and runs until the round either
    /// needs more decisions or completes.
    ///
    /// An unanswered request degrades to a pass; a pass on plan creation
    /// degrades to the default plan. The round therefore always
    /// terminates even against a caller that answers nothing.
    pub fn advance(&mut self, world: &mut WorldState, responses: &[Response]) -> StepResult {
        let mut events = Vec::new();
        if !self.complete && !self.pending.is_empty() {
            self.apply_responses(world, responses, &mut events);
        }
        while self.pending.is_empty() && !self.complete {
            self.step(world, &mut events);
        }
        StepResult {
            pending: self.pending.clone(),
            simultaneous: self.simultaneous,
            events,
            complete: self.complete,
            next_phase: self.complete.then_some(PhaseId::Collection),
        }
    }

    /// Runs one unit of work: emit the next request set or make a
    /// sub-phase transition.
    fn step(&mut self, world: &mut WorldState, events: &mut Vec<Event>) {
        let Some(sub_phase) = self.engagement.as_ref().map(|e| e.sub_phase) else {
            self.offer_engagement_choice(world);
            return;
        };
        match sub_phase {
            SubPhase::Compulsion => self.offer_ability(world, Ability::Compulsion),
            SubPhase::Query => self.offer_ability(world, Ability::Foresight),
            SubPhase::Reveal => self.request_reveal(),
            SubPhase::Planning => self.request_plans(world),
            SubPhase::Betrayal => self.open_betrayal_window(world),
            SubPhase::Resolve => self.resolve_engagement(world, events),
            SubPhase::DiscardChoice => self.request_discard_choice(),
            SubPhase::CaptureChoice => self.request_capture_choice(),
            SubPhase::Done => self.retire_engagement(world, events),
        }
    }

    /// Dispatches responses by the kind of request that was pending.
    fn apply_responses(
        &mut self,
        world: &mut WorldState,
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let pending = std::mem::take(&mut self.pending);
        self.simultaneous = false;
        let Some(first) = pending.first() else {
            return;
        };
        match first.kind() {
            RequestKind::ChooseEngagement => {
                self.apply_engagement_choice(first, responses, events);
            }
            RequestKind::UseCompulsion => self.apply_compulsion(first, responses, events),
            RequestKind::UseQuery => self.apply_query(first, responses, events),
            RequestKind::RevealQueryElement => self.apply_reveal(first, responses, events),
            RequestKind::CreatePlan => self.apply_plans(world, &pending, responses, events),
            RequestKind::DeclareBetrayal => {
                self.apply_betrayal_declarations(&pending, responses, events);
            }
            RequestKind::ChooseCardsToDiscard => {
                self.apply_discard(world, first, responses, events);
            }
            RequestKind::CaptureChoice => self.apply_capture(world, first, responses, events),
        }
    }

    // --- engagement selection ---

    /// Walks the engagement order until someone has a battle to pick, or
    /// the phase is over.
    fn offer_engagement_choice(&mut self, world: &WorldState) {
        while self.order_idx < self.order.len() && !self.worklist.is_empty() {
            let faction = self.order[self.order_idx];
            let mut options = self.options_for(faction, world);
            match self.reoffer {
                Some((f, territory)) if f == faction => {
                    options.retain(|o| o.territory == territory);
                }
                _ => self.reoffer = None,
            }
            if options.is_empty() {
                self.order_idx += 1;
                self.reoffer = None;
                continue;
            }
            debug!(faction = faction.name(), options = options.len(), "offering engagements");
            self.pending = vec![Request {
                faction,
                context: RequestContext::ChooseEngagement { options },
            }];
            return;
        }
        self.complete = true;
    }

    fn options_for(&self, faction: Faction, world: &WorldState) -> Vec<EngagementOption> {
        let mut options = Vec::new();
        for site in &self.worklist {
            for opponent in site.opponents_of(faction, world) {
                options.push(EngagementOption { territory: site.territory, opponent });
            }
        }
        options
    }

    fn apply_engagement_choice(
        &mut self,
        request: &Request,
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let aggressor = request.faction;
        let RequestContext::ChooseEngagement { options } = &request.context else {
            return;
        };
        let choice = match answer_of(responses, aggressor) {
            Some(ResponseData::ChooseEngagement { territory, opponent }) => options
                .iter()
                .find(|o| o.territory == *territory && o.opponent == *opponent)
                .copied(),
            _ => None,
        };
        match choice {
            Some(option) => {
                events.push(Event::EngagementStarted {
                    territory: option.territory,
                    aggressor,
                    defender: option.opponent,
                });
                self.engagement =
                    Some(Engagement::new(option.territory, aggressor, option.opponent));
            }
            None => {
                // Pass, no answer, or a stale choice: the turn ends.
                self.order_idx += 1;
                self.reoffer = None;
            }
        }
    }

    // --- information asymmetry ---

    /// Offers a pre-plan ability to its owning faction when it, or its
    /// ally, fights here. A non-combatant owner exercises the ability
    /// against its ally's opponent. The ability tables give each ability to
    /// at most one faction, so at most one offer per engagement.
    fn offer_ability(&mut self, world: &WorldState, ability: Ability) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let holder = [Side::Aggressor, Side::Defender].into_iter().find_map(|side| {
            let combatant = eng.faction(side);
            let target = eng.faction(side.opponent());
            if combatant.has(ability) {
                return Some((combatant, target));
            }
            let ally = world.ally_of(combatant)?;
            (eng.side_of(ally).is_none() && ally.has(ability)).then_some((ally, target))
        });
        let Some((faction, target)) = holder else {
            eng.sub_phase = next_information_phase(eng.sub_phase);
            return;
        };
        let context = match ability {
            Ability::Compulsion => RequestContext::UseCompulsion { target },
            _ => RequestContext::UseQuery {
                target,
                categories: ALL_QUERY_CATEGORIES.to_vec(),
            },
        };
        self.pending = vec![Request { faction, context }];
    }

    fn apply_compulsion(
        &mut self,
        request: &Request,
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let RequestContext::UseCompulsion { target } = request.context else {
            return;
        };
        if let Some(ResponseData::UseCompulsion { must, constraint }) =
            answer_of(responses, request.faction)
        {
            let command = CompulsionCommand {
                by: request.faction,
                target,
                must: *must,
                constraint: *constraint,
            };
            eng.compulsion = Some(command);
            events.push(Event::CompulsionUsed { command });
        }
        eng.sub_phase = SubPhase::Query;
    }

    fn apply_query(
        &mut self,
        request: &Request,
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let RequestContext::UseQuery { target, .. } = request.context else {
            return;
        };
        match answer_of(responses, request.faction) {
            Some(ResponseData::UseQuery { category }) => {
                eng.query_used = true;
                eng.query_owner = Some(request.faction);
                eng.query_target = Some(target);
                eng.query_category = Some(*category);
                events.push(Event::QueryUsed {
                    by: request.faction,
                    target,
                    category: *category,
                });
                eng.sub_phase = SubPhase::Reveal;
            }
            _ => eng.sub_phase = SubPhase::Planning,
        }
    }

    fn request_reveal(&mut self) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let (Some(target), Some(category)) = (eng.query_target, eng.query_category) else {
            eng.sub_phase = SubPhase::Planning;
            return;
        };
        self.pending = vec![Request {
            faction: target,
            context: RequestContext::RevealQueryElement { category },
        }];
    }

    fn apply_reveal(
        &mut self,
        request: &Request,
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let RequestContext::RevealQueryElement { category } = request.context else {
            return;
        };
        // A pass or a reveal of the wrong category binds as "none".
        let commitment = match answer_of(responses, request.faction) {
            Some(ResponseData::Reveal { commitment }) if commitment.category() == category => {
                *commitment
            }
            _ => Commitment::default_for(category),
        };
        eng.commitment = Some(commitment);
        events.push(Event::QueryRevealed { faction: request.faction, commitment });
        eng.sub_phase = SubPhase::Planning;
    }

    // --- planning ---

    /// Emits both plan requests as one sealed simultaneous set.
    fn request_plans(&mut self, world: &WorldState) {
        let Some(eng) = self.engagement.as_ref() else {
            return;
        };
        let mut requests = Vec::with_capacity(2);
        for side in [Side::Aggressor, Side::Defender] {
            let faction = eng.faction(side);
            // A reveal bound by a non-combatant owner's query reaches the
            // owner's combatant ally.
            let sees_reveal = eng.query_owner.is_some_and(|owner| {
                owner == faction || world.ally_of(faction) == Some(owner)
            });
            requests.push(Request {
                faction,
                context: RequestContext::CreatePlan {
                    territory: eng.territory,
                    opponent: eng.faction(side.opponent()),
                    compulsion: eng.compulsion.filter(|c| c.target == faction),
                    commitment: eng.commitment.filter(|_| eng.query_target == Some(faction)),
                    revealed: eng.commitment.filter(|_| sees_reveal),
                },
            });
        }
        self.pending = requests;
        self.simultaneous = true;
    }

    fn apply_plans(
        &mut self,
        world: &WorldState,
        pending: &[Request],
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        for request in pending {
            let faction = request.faction;
            let Some(side) = eng.side_of(faction) else {
                continue;
            };
            let commitment =
                eng.commitment.filter(|_| eng.query_target == Some(faction));
            let submitted = match answer_of(responses, faction) {
                Some(ResponseData::Plan { plan }) => Some(*plan),
                _ => None,
            };
            let (plan, accepted, violation) = match submitted {
                Some(plan) => {
                    match validate_plan(world, faction, eng.territory, &plan, commitment.as_ref())
                    {
                        Ok(()) => (plan, true, None),
                        Err(v) => {
                            warn!(faction = faction.name(), violation = %v, "plan rejected");
                            (Plan::fallback(), false, Some(v.to_string()))
                        }
                    }
                }
                None => (Plan::fallback(), false, None),
            };
            events.push(Event::PlanSubmitted { faction, accepted, violation });
            eng.set_plan(side, plan);
        }
        eng.sub_phase = SubPhase::Betrayal;
    }

    // --- betrayal ---

    fn open_betrayal_window(&mut self, world: &WorldState) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let candidates = betrayal_candidates(world, eng);
        if candidates.is_empty() {
            eng.betrayal = BetrayalCall::None;
            eng.sub_phase = SubPhase::Resolve;
            return;
        }
        let mut requests = Vec::with_capacity(candidates.len());
        for (side, declarer) in &candidates {
            let Some(leader) = eng.plan(side.opponent()).and_then(|p| p.leader) else {
                continue;
            };
            requests.push(Request {
                faction: *declarer,
                context: RequestContext::DeclareBetrayal {
                    territory: eng.territory,
                    side: *side,
                    leader,
                },
            });
        }
        self.pending = requests;
        self.simultaneous = true;
    }

    fn apply_betrayal_declarations(
        &mut self,
        pending: &[Request],
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let mut declared = Vec::new();
        for request in pending {
            let RequestContext::DeclareBetrayal { side, leader, .. } = request.context else {
                continue;
            };
            if matches!(answer_of(responses, request.faction), Some(ResponseData::Betray)) {
                declared.push((side, request.faction));
                events.push(Event::BetrayalRevealed { declarer: request.faction, leader });
            }
        }
        eng.betrayal = classify(&declared);
        if eng.betrayal == BetrayalCall::Mutual {
            events.push(Event::MutualBetrayal { territory: eng.territory });
        }
        eng.sub_phase = SubPhase::Resolve;
    }

    // --- resolution and consequences ---

    fn resolve_engagement(&mut self, world: &mut WorldState, events: &mut Vec<Event>) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        if let Some(command) = eng.compulsion {
            let complied = eng
                .side_of(command.target)
                .and_then(|s| eng.plan(s))
                .map_or(true, |plan| complies_with(plan, &command));
            if !complied {
                warn!(faction = command.target.name(), "compulsion command violated");
                events.push(Event::CompulsionViolated { faction: command.target, command });
            }
        }

        let outcome = resolve(world, eng);
        if outcome.mutual_destruction {
            events.push(Event::CatastrophicDestruction { territory: outcome.territory });
        } else {
            events.push(Event::Resolved {
                territory: outcome.territory,
                winner: outcome.winning_faction(),
                aggressor_strength: outcome.strengths[Side::Aggressor.index()],
                defender_strength: outcome.strengths[Side::Defender.index()],
            });
        }

        match apply_outcome(world, eng, &outcome) {
            Ok(applied) => {
                events.extend(applied);
                eng.discard_candidates = outcome
                    .winner
                    .map(|s| outcome.side(s).cards_to_keep.clone())
                    .unwrap_or_default();
                eng.capture_target = capture_opportunity(world, &outcome);
                eng.outcome = Some(outcome);
                eng.sub_phase = SubPhase::DiscardChoice;
            }
            Err(err) => {
                // The batch rolled back; abandon the engagement's effects.
                events.push(Event::InvariantBreach { detail: err.to_string() });
                eng.sub_phase = SubPhase::Done;
            }
        }
    }

    fn request_discard_choice(&mut self) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let winner = eng.outcome.as_ref().and_then(|o| o.winning_faction());
        let (Some(winner), false) = (winner, eng.discard_candidates.is_empty()) else {
            eng.sub_phase = SubPhase::CaptureChoice;
            return;
        };
        self.pending = vec![Request {
            faction: winner,
            context: RequestContext::ChooseCardsToDiscard {
                candidates: eng.discard_candidates.clone(),
            },
        }];
    }

    fn apply_discard(
        &mut self,
        world: &mut WorldState,
        request: &Request,
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        // A pass keeps every candidate.
        let empty = Vec::new();
        let discard = match answer_of(responses, request.faction) {
            Some(ResponseData::Discard { cards }) => cards,
            _ => &empty,
        };
        match apply_discard_choice(world, request.faction, &eng.discard_candidates, discard) {
            Ok(applied) => events.extend(applied),
            Err(err) => events.push(Event::InvariantBreach { detail: err.to_string() }),
        }
        eng.sub_phase = SubPhase::CaptureChoice;
    }

    fn request_capture_choice(&mut self) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let winner = eng.outcome.as_ref().and_then(|o| o.winning_faction());
        let (Some(winner), Some(leader)) = (winner, eng.capture_target) else {
            eng.sub_phase = SubPhase::Done;
            return;
        };
        self.pending = vec![Request {
            faction: winner,
            context: RequestContext::CaptureChoice { leader, reward: CAPTURE_REWARD },
        }];
    }

    fn apply_capture(
        &mut self,
        world: &mut WorldState,
        request: &Request,
        responses: &[Response],
        events: &mut Vec<Event>,
    ) {
        let Some(eng) = self.engagement.as_mut() else {
            return;
        };
        let RequestContext::CaptureChoice { leader, .. } = request.context else {
            return;
        };
        // A pass takes the leader into custody rather than the reward.
        let destroy = matches!(
            answer_of(responses, request.faction),
            Some(ResponseData::Capture { destroy: true })
        );
        match apply_capture_choice(world, request.faction, leader, destroy) {
            Ok(applied) => events.extend(applied),
            Err(err) => events.push(Event::InvariantBreach { detail: err.to_string() }),
        }
        eng.sub_phase = SubPhase::Done;
    }

    /// Drops the finished engagement, rescans for battles, and pins the
    /// aggressor to the same territory if it still has opponents there.
    fn retire_engagement(&mut self, world: &WorldState, events: &mut Vec<Event>) {
        let Some(eng) = self.engagement.take() else {
            return;
        };
        events.push(Event::EngagementEnded { territory: eng.territory });
        self.worklist = locate_battles(world);
        let unfinished_here = self
            .worklist
            .iter()
            .any(|site| {
                site.territory == eng.territory
                    && !site.opponents_of(eng.aggressor, world).is_empty()
            });
        self.reoffer = unfinished_here.then_some((eng.aggressor, eng.territory));
    }
}

/// The ordering of the pre-plan information sub-phases.
fn next_information_phase(current: SubPhase) -> SubPhase {
    match current {
        SubPhase::Compulsion => SubPhase::Query,
        _ => SubPhase::Planning,
    }
}

/// Finds a faction's answering payload among the responses, if any.
/// A pass or a missing response both come back as `None`.
fn answer_of(responses: &[Response], faction: Faction) -> Option<&ResponseData> {
    responses
        .iter()
        .find(|r| r.faction == faction)
        .filter(|r| !r.passed)
        .and_then(|r| r.data.as_ref())
}
