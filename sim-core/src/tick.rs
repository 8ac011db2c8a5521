//! Tick driver (§4.12): owns the `Simulation` lifecycle and runs the
//! ten-phase loop once per tick in a fixed order —
//! Mode-select, Housekeeping, Perception, Decision, Movement, Matching,
//! Bargaining/Execution, Forage, Resource Regeneration, Telemetry.
//!
//! Each phase iterates agents in ascending `AgentId` order wherever order
//! can affect outcomes, so two runs built from the same scenario and seed
//! produce bit-identical trajectories (§5).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand_chacha::ChaCha8Rng;

use crate::agent::Agent;
use crate::bargain::{BargainingProtocol, CompensatingBlockSearch, Outcome};
use crate::error::{ConfigError, InvariantViolation};
use crate::grid::ResourceKind;
use crate::matching::{LegacyThreePassMatching, MatchingProtocol};
use crate::perception::perceive;
use crate::quotes::{compute_quotes, filter_quotes_by_regime, QuoteSet};
use crate::scenario::ScenarioConfig;
use crate::search::{best_pair_surplus, LegacyDistanceDiscountedSearch, SearchContext, SearchProtocol, TargetIntent};
use crate::telemetry::{LogConfig, TelemetrySink, TracingSink};
use crate::types::{AgentId, DistanceMetric, ExchangeRegime, Good, Mode};
use crate::world::World;

/// Caller-supplied overrides for the sink and the three pluggable
/// protocols (§6 `new_simulation`'s `[search?, matching?, bargaining?]`).
/// Anything left `None` falls back to the reference implementation.
#[derive(Default)]
pub struct SimulationBuilder {
    pub sink: Option<Box<dyn TelemetrySink>>,
    pub search: Option<Box<dyn SearchProtocol>>,
    pub matching: Option<Box<dyn MatchingProtocol>>,
    pub bargaining: Option<Box<dyn BargainingProtocol>>,
}

/// The constructed, runnable simulation. Owns the `World` plus the sink and
/// pluggable protocols; `step` advances exactly one tick.
pub struct Simulation {
    world: World,
    sink: Box<dyn TelemetrySink>,
    search: Box<dyn SearchProtocol>,
    matching: Box<dyn MatchingProtocol>,
    bargaining: Box<dyn BargainingProtocol>,
    scenario_fingerprint: u64,
    prev_mode: Mode,
    started: bool,
    closed: bool,
}

fn scenario_fingerprint(cfg: &ScenarioConfig) -> u64 {
    let json = serde_json::to_string(cfg).expect("ScenarioConfig always serializes");
    let mut hasher = DefaultHasher::new();
    json.hash(&mut hasher);
    hasher.finish()
}

/// `new_simulation` (§6): validates the scenario, builds the `World`, and
/// wires up the sink plus whichever protocols the caller supplied.
/// `SimulationBuilder::default()` resolves to every reference protocol and
/// a `TracingSink` configured from `log_config`.
pub fn new_simulation(
    scenario: &ScenarioConfig,
    log_config: LogConfig,
    builder: SimulationBuilder,
) -> Result<Simulation, ConfigError> {
    scenario.validate()?;
    let fingerprint = scenario_fingerprint(scenario);
    let world = World::from_scenario(scenario);
    let prev_mode = world.current_mode();
    Ok(Simulation {
        world,
        sink: builder.sink.unwrap_or_else(|| Box::new(TracingSink::new(log_config))),
        search: builder.search.unwrap_or_else(|| Box::new(LegacyDistanceDiscountedSearch)),
        matching: builder.matching.unwrap_or_else(|| Box::new(LegacyThreePassMatching)),
        bargaining: builder.bargaining.unwrap_or_else(|| Box::new(CompensatingBlockSearch)),
        scenario_fingerprint: fingerprint,
        prev_mode,
        started: false,
        closed: false,
    })
}

fn decision_target_type(intent: &TargetIntent) -> &'static str {
    match (intent.target_agent_id, intent.target_pos) {
        (Some(_), _) => "trade",
        (None, Some(_)) => "forage",
        (None, None) => "idle",
    }
}

fn decision_surplus(agent: &Agent, intent: &TargetIntent, regime: ExchangeRegime) -> f64 {
    let Some(partner_id) = intent.target_agent_id else { return 0.0 };
    agent
        .perception_cache
        .agents
        .iter()
        .find(|v| v.agent_id == partner_id)
        .map(|v| best_pair_surplus(&agent.quotes, &v.quotes, regime))
        .unwrap_or(0.0)
}

impl Simulation {
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tick(&self) -> u64 {
        self.world.tick
    }

    /// Advances the simulation by exactly one tick, running all ten phases
    /// in order. Emits `on_run_start` on the very first call.
    pub fn step(&mut self) {
        if !self.started {
            self.started = true;
            self.sink.on_run_start(self.scenario_fingerprint, self.world.rng.run_seed());
        }

        let tick = self.world.tick;
        let regime = self.world.regime;

        // 1. Mode-select.
        let mode = self.world.current_mode();
        if mode != self.prev_mode {
            self.sink.on_mode_change(tick, self.prev_mode, mode);
        }
        self.prev_mode = mode;
        self.sink.on_tick_state(tick, mode, regime);

        // 2. Housekeeping: recompute quotes for every agent whose inventory
        // changed since the last pass, including every agent on tick 0.
        for agent in self.world.agents.iter_mut() {
            if !agent.inventory_changed {
                continue;
            }
            let quotes = compute_quotes(
                &agent.utility,
                agent.inventory,
                agent.lambda_money,
                self.world.money.as_ref(),
                self.world.spread,
                self.world.epsilon,
                self.world.money_scale,
            );
            agent.quotes = filter_quotes_by_regime(quotes, regime);
            agent.inventory_changed = false;
        }

        // 3. Perception: snapshot against the just-refreshed quote set so
        // later phases this tick see a stable dict regardless of what they
        // mutate.
        let quotes_snapshot: Vec<QuoteSet> = self.world.agents.iter().map(|a| a.quotes).collect();
        for agent in self.world.agents.iter_mut() {
            perceive(agent, &self.world.spatial, &self.world.grid, &|id| quotes_snapshot[id as usize]);
        }

        // 4. Decision/Search: one `SetTarget` effect per agent, ascending id.
        let ctx = SearchContext { regime, beta: self.world.beta, epsilon: self.world.epsilon, forage_rate: self.world.forage_rate };
        for i in 0..self.world.agents.len() as AgentId {
            let mut rng: ChaCha8Rng = self.world.rng.agent_substream(&format!("search:{tick}"), i);
            let intent = self.search.decide(&self.world.agents[i as usize], &ctx, &mut rng);
            let target_type = decision_target_type(&intent);
            let surplus = decision_surplus(&self.world.agents[i as usize], &intent, regime);
            let num_neighbors = self.world.agents[i as usize].perception_cache.agents.len();
            self.sink.on_decision(tick, i, intent.target_agent_id, surplus, target_type, intent.target_pos, num_neighbors);
            let agent = &mut self.world.agents[i as usize];
            agent.target_pos = intent.target_pos;
            agent.target_agent_id = intent.target_agent_id;
        }

        // 5. Movement: greedy single-step advance toward `target_pos`.
        for agent in self.world.agents.iter_mut() {
            crate::movement::move_agent(agent, &self.world.grid, &mut self.world.spatial);
        }

        // 6. Matching (trade mode only).
        let pairs = if mode.trade_active() {
            let mut pairs = self.matching.match_agents(
                &mut self.world.agents,
                DistanceMetric::Chebyshev,
                regime,
                self.world.interaction_radius,
                tick,
            );
            pairs.sort_unstable();
            pairs
        } else {
            Vec::new()
        };

        // 7. Bargaining & Execution, lower id first. Pairing state does not
        // survive a tick (§3): both outcomes below clear it.
        for (i, j) in pairs {
            let outcome = self.bargaining.bargain(
                &mut self.world.agents,
                i,
                j,
                regime,
                self.world.money.as_ref(),
                self.world.epsilon,
                self.world.max_block_size,
                tick,
                self.sink.as_mut(),
            );
            match outcome {
                Outcome::Executed(record) => {
                    let pos = self.world.agents[record.buyer_id as usize].pos;
                    let buyer_lambda = self.world.agents[record.buyer_id as usize].lambda_money;
                    let seller_lambda = self.world.agents[record.seller_id as usize].lambda_money;
                    self.sink.on_trade_executed(
                        tick,
                        record.buyer_id,
                        record.seller_id,
                        pos,
                        record.da,
                        record.d_unit,
                        record.price,
                        record.pair,
                        buyer_lambda,
                        seller_lambda,
                    );
                    debug_assert!(
                        record.buyer_gain > 0.0 && record.seller_gain > 0.0,
                        "{}",
                        InvariantViolation::NonImprovingTrade {
                            buyer: record.buyer_id,
                            seller: record.seller_id,
                            offender: record.buyer_id
                        }
                    );
                }
                Outcome::Cooldown => {
                    let until = tick + self.world.trade_cooldown_ticks;
                    self.world.agents[i as usize].set_cooldown(j, until);
                    self.world.agents[j as usize].set_cooldown(i, until);
                }
            }
            self.world.agents[i as usize].paired_with_id = None;
            self.world.agents[j as usize].paired_with_id = None;
        }

        // 8. Forage (forage mode only). Co-located agents are served in
        // ascending id order, so later agents see whatever the earlier ones
        // left behind on a shared cell.
        if mode.forage_active() {
            for i in 0..self.world.agents.len() {
                let pos = self.world.agents[i].pos;
                let cell = self.world.grid.cell(pos);
                let Some(kind) = cell.resource else { continue };
                if cell.amount == 0 {
                    continue;
                }
                let taken = self.world.grid.harvest(pos, self.world.forage_rate, tick);
                if taken == 0 {
                    continue;
                }
                let agent = &mut self.world.agents[i];
                match kind {
                    ResourceKind::A => agent.inventory.a += taken,
                    ResourceKind::B => agent.inventory.b += taken,
                }
                agent.mark_inventory_changed();
            }
        }

        // 9. Resource regeneration: runs every tick regardless of mode.
        self.world.grid.regenerate(tick, self.world.growth_rate, self.world.resource_max_amount, self.world.regen_cooldown);

        // 10. Telemetry: cadenced snapshots; the sink itself decides
        // whether a given tick is due.
        for agent in &self.world.agents {
            self.sink.on_agent_snapshot(
                tick,
                agent.id,
                agent.pos,
                agent.inventory.a,
                agent.inventory.b,
                agent.inventory.m,
                agent.utility.variant_tag(),
                agent.target_pos,
            );
        }
        for pos in self.world.grid.resource_positions() {
            let cell = self.world.grid.cell(pos);
            let resource_tag = cell.resource.map(|k| match k {
                ResourceKind::A => "a",
                ResourceKind::B => "b",
            });
            self.sink.on_resource_snapshot(tick, pos, resource_tag, cell.amount);
        }

        self.world.tick += 1;
    }

    /// Runs `step` until `self.tick() == max_ticks`, then closes the sink.
    pub fn run(&mut self, max_ticks: u64) {
        while self.world.tick < max_ticks {
            self.step();
        }
        self.close();
    }

    /// Idempotent telemetry flush. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.sink.on_run_end(self.world.tick);
        self.sink.close();
    }
}
