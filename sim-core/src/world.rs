//! World state container (§3): owns the agent roster, grid, and spatial
//! index, and builds them from a validated `ScenarioConfig` and seed.
//!
//! Mirrors the teacher's `World` — a single owning struct that the tick
//! driver mutates phase by phase, with everything else (search/matching
//! protocols, the telemetry sink) borrowing into it rather than owning a
//! copy.

use crate::agent::Agent;
use crate::grid::{Grid, ResourceKind};
use crate::mode::{ModeSchedule, ModeScheduler};
use crate::money::{MoneyParams, MoneyUtilityForm};
use crate::quotes::QuoteSet;
use crate::rng::RngStreams;
use crate::scenario::{ScenarioConfig, UtilityParamsConfig};
use crate::spatial::SpatialIndex;
use crate::types::{AgentId, DistanceMetric, ExchangeRegime, Mode, Position};
use crate::utility::{Ces, Linear, Quadratic, StoneGeary, Translog, Utility};
use rand::Rng;

/// Everything the tick driver reads and mutates across phases.
pub struct World {
    pub tick: u64,
    pub agents: Vec<Agent>,
    pub grid: Grid,
    pub spatial: SpatialIndex,
    pub mode_scheduler: ModeScheduler,
    pub regime: ExchangeRegime,
    /// Scenario-wide money parameters (form, `m_0`); per-agent `lambda` is
    /// carried on `Agent::lambda_money` and substituted in at bargain time,
    /// so the `lambda` field here is a placeholder never read directly.
    pub money: Option<MoneyParams>,
    pub spread: f64,
    pub epsilon: f64,
    pub money_scale: f64,
    pub interaction_radius: i32,
    pub max_block_size: u32,
    pub trade_cooldown_ticks: u64,
    pub beta: f64,
    pub forage_rate: u32,
    pub growth_rate: u32,
    pub resource_max_amount: u32,
    pub regen_cooldown: u64,
    pub rng: RngStreams,
}

fn build_utility(params: &UtilityParamsConfig) -> Utility {
    match params {
        UtilityParamsConfig::Ces { rho, w_a, w_b } => {
            Utility::Ces(Ces::new(*rho, *w_a, *w_b).expect("validated by ScenarioConfig::validate"))
        }
        UtilityParamsConfig::Linear { v_a, v_b } => {
            Utility::Linear(Linear::new(*v_a, *v_b).expect("validated by ScenarioConfig::validate"))
        }
        UtilityParamsConfig::Quadratic { a_star, b_star, sigma_a, sigma_b, gamma } => Utility::Quadratic(
            Quadratic::new(*a_star, *b_star, *sigma_a, *sigma_b, *gamma).expect("validated by ScenarioConfig::validate"),
        ),
        UtilityParamsConfig::Translog { alpha_0, alpha_a, alpha_b, beta_aa, beta_bb, beta_ab } => Utility::Translog(
            Translog::new(*alpha_0, *alpha_a, *alpha_b, *beta_aa, *beta_bb, *beta_ab)
                .expect("validated by ScenarioConfig::validate"),
        ),
        UtilityParamsConfig::StoneGeary { alpha_a, alpha_b, gamma_a, gamma_b } => Utility::StoneGeary(
            StoneGeary::new(*alpha_a, *alpha_b, *gamma_a, *gamma_b).expect("validated by ScenarioConfig::validate"),
        ),
    }
}

/// Picks one utility-mix entry for an agent by weighted draw against a
/// dedicated RNG sub-stream, so utility assignment never perturbs the
/// placement or resource sub-streams (§5, §9).
fn assign_utility(cfg: &ScenarioConfig, draw: f64) -> Utility {
    let total: f64 = cfg.utility_mix.iter().map(|e| e.weight).sum();
    let mut threshold = draw * total;
    for entry in &cfg.utility_mix {
        threshold -= entry.weight;
        if threshold <= 0.0 {
            return build_utility(&entry.params);
        }
    }
    build_utility(&cfg.utility_mix.last().expect("validated: non-empty utility_mix").params)
}

impl World {
    /// Builds a `World` from an already-validated scenario. Callers MUST
    /// call `scenario.validate()` first — this does not re-check §6's
    /// constraints, only assumes them.
    pub fn from_scenario(cfg: &ScenarioConfig) -> Self {
        let rng = RngStreams::new(cfg.seed);
        let regime = ExchangeRegime::parse(&cfg.regime).expect("validated by ScenarioConfig::validate");
        let money = cfg.money.as_ref().map(|m| MoneyParams {
            form: MoneyUtilityForm::parse(&m.form).expect("validated by ScenarioConfig::validate"),
            lambda: 0.0,
            m_0: m.m_0,
        });

        let mut grid = Grid::new(cfg.grid.width, cfg.grid.height);
        let mut resource_rng = rng.substream("resources");
        for y in 0..cfg.grid.height {
            for x in 0..cfg.grid.width {
                if resource_rng.random::<f64>() < cfg.grid.resource_density {
                    let kind = if resource_rng.random_bool(0.5) { ResourceKind::A } else { ResourceKind::B };
                    grid.seed_cell(Position::new(x, y), kind, cfg.grid.resource_amount);
                }
            }
        }

        let mut spatial = SpatialIndex::new(DistanceMetric::Chebyshev);
        let mut placement_rng = rng.substream("placement");
        let mut utility_rng = rng.substream("utility_mix");
        let mut agents = Vec::with_capacity(cfg.agents.len());
        for agent_cfg in &cfg.agents {
            let pos = Position::new(
                placement_rng.random_range(0..cfg.grid.width.max(1)),
                placement_rng.random_range(0..cfg.grid.height.max(1)),
            );
            let utility = assign_utility(cfg, utility_rng.random::<f64>());
            let agent = Agent::new(
                agent_cfg.agent_id,
                pos,
                crate::types::Inventory::new(
                    agent_cfg.initial_a as u32,
                    agent_cfg.initial_b as u32,
                    agent_cfg.initial_m as u32,
                ),
                utility,
                agent_cfg.lambda_money,
                agent_cfg.vision_radius,
                agent_cfg.move_budget_per_tick,
            );
            spatial.insert(agent.id, agent.pos);
            agents.push(agent);
        }

        let mode_scheduler = match &cfg.mode_schedule {
            Some(sched) => ModeScheduler::new(Some(ModeSchedule {
                forage_ticks: sched.forage_ticks,
                trade_ticks: sched.trade_ticks,
                start_mode: sched.start_mode,
            })),
            None => ModeScheduler::always_both(),
        };

        Self {
            tick: 0,
            agents,
            grid,
            spatial,
            mode_scheduler,
            regime,
            money,
            spread: cfg.spread,
            epsilon: cfg.epsilon,
            money_scale: cfg.money_scale,
            interaction_radius: cfg.interaction_radius,
            max_block_size: cfg.max_block_size,
            trade_cooldown_ticks: cfg.trade_cooldown_ticks,
            beta: cfg.beta,
            forage_rate: cfg.grid.forage_rate,
            growth_rate: cfg.grid.growth_rate,
            resource_max_amount: cfg.grid.max_amount,
            regen_cooldown: cfg.grid.regen_cooldown,
            rng,
        }
    }

    pub fn current_mode(&self) -> Mode {
        self.mode_scheduler.mode_at(self.tick)
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id as usize]
    }

    pub fn quotes_of(&self, id: AgentId) -> QuoteSet {
        self.agents[id as usize].quotes
    }

    /// Sum of a good across every agent — used by invariant/property
    /// checks (§8), never by the tick driver itself.
    pub fn total_inventory(&self, good: crate::types::Good) -> u64 {
        self.agents.iter().map(|a| a.inventory.get(good) as u64).sum()
    }
}
