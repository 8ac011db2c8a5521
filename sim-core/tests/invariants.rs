//! Checks the quantified invariants that must hold at every tick boundary,
//! across a handful of randomized scenarios rather than a single fixed one:
//! non-negative inventories, conserved totals on trade-only ticks, symmetric
//! pairing, and a harvested-active-set that never drifts from the cells it
//! actually tracks.

use sim_core::scenario::{
    AgentInitConfig, GridConfig, ModeScheduleConfig, ScenarioConfig, UtilityMixEntry, UtilityParamsConfig,
};
use sim_core::{new_simulation, Good, LogConfig, Mode, NullSink, SimulationBuilder};

fn scenario(seed: u64, n_agents: u32, regime: &str) -> ScenarioConfig {
    ScenarioConfig {
        schema_version: "1".to_string(),
        seed,
        grid: GridConfig {
            width: 12,
            height: 12,
            resource_density: 0.25,
            resource_amount: 6,
            growth_rate: 1,
            max_amount: 6,
            regen_cooldown: 2,
            forage_rate: 1,
        },
        utility_mix: vec![
            UtilityMixEntry { weight: 0.5, params: UtilityParamsConfig::Linear { v_a: 1.0, v_b: 1.3 } },
            UtilityMixEntry { weight: 0.5, params: UtilityParamsConfig::Ces { rho: -0.5, w_a: 1.0, w_b: 1.0 } },
        ],
        agents: (0..n_agents)
            .map(|id| AgentInitConfig {
                agent_id: id,
                initial_a: 8,
                initial_b: 8,
                initial_m: 0,
                lambda_money: 1.0,
                vision_radius: 6,
                move_budget_per_tick: 1,
            })
            .collect(),
        regime: regime.to_string(),
        money: None,
        spread: 0.02,
        epsilon: 1e-9,
        money_scale: 1.0,
        interaction_radius: 2,
        max_block_size: 5,
        trade_cooldown_ticks: 2,
        beta: 0.9,
        mode_schedule: None,
    }
}

fn builder() -> SimulationBuilder {
    SimulationBuilder { sink: Some(Box::new(NullSink)), ..Default::default() }
}

fn assert_cell_invariant(sim: &sim_core::Simulation) {
    let grid = &sim.world().grid;
    for pos in grid.resource_positions() {
        let cell = grid.cell(pos);
        let active = grid.active_positions().any(|p| p == pos);
        if !active {
            assert_eq!(
                cell.amount, cell.original_amount,
                "cell at {pos:?} is outside the active set but has drifted from its original amount"
            );
        }
    }
}

fn assert_pairing_symmetric_or_absent(sim: &sim_core::Simulation) {
    // Pairing never survives past the Bargaining phase (see tick.rs), so by
    // the time `step` returns every agent's `paired_with_id` is `None` —
    // which is trivially symmetric. Assert that directly rather than
    // reaching into a mid-tick snapshot the public API doesn't expose.
    for agent in &sim.world().agents {
        assert_eq!(agent.paired_with_id, None);
    }
}

fn assert_non_negative_inventory(sim: &sim_core::Simulation) {
    for agent in &sim.world().agents {
        assert!(agent.inventory.a < u32::MAX, "inventory.a overflowed");
        assert!(agent.inventory.b < u32::MAX, "inventory.b overflowed");
        assert!(agent.inventory.m < u32::MAX, "inventory.m overflowed");
    }
}

#[test]
fn inventories_and_cells_stay_consistent_across_many_seeds_and_population_sizes() {
    for (seed, n_agents, regime) in
        [(1u64, 3u32, "barter_only"), (2, 6, "barter_only"), (3, 4, "mixed"), (4, 8, "barter_only")]
    {
        let cfg = scenario(seed, n_agents, regime);
        let mut sim = new_simulation(&cfg, LogConfig::standard(), builder()).unwrap();
        for _ in 0..40 {
            sim.step();
            assert_non_negative_inventory(&sim);
            assert_cell_invariant(&sim);
            assert_pairing_symmetric_or_absent(&sim);
        }
    }
}

#[test]
fn trade_only_ticks_conserve_total_goods_across_seeds() {
    for seed in [10u64, 11, 12, 13, 14] {
        let mut cfg = scenario(seed, 5, "barter_only");
        cfg.mode_schedule = Some(ModeScheduleConfig { forage_ticks: 0, trade_ticks: 1, start_mode: Mode::Trade });
        let mut sim = new_simulation(&cfg, LogConfig::standard(), builder()).unwrap();
        let total_a_before = sim.world().total_inventory(Good::A);
        let total_b_before = sim.world().total_inventory(Good::B);
        sim.run(25);
        assert_eq!(sim.world().total_inventory(Good::A), total_a_before, "seed {seed}: total A drifted on a trade-only run");
        assert_eq!(sim.world().total_inventory(Good::B), total_b_before, "seed {seed}: total B drifted on a trade-only run");
    }
}

#[test]
fn forage_only_run_never_decreases_total_goods_held_by_agents() {
    let mut cfg = scenario(20, 5, "barter_only");
    cfg.mode_schedule = Some(ModeScheduleConfig { forage_ticks: 1, trade_ticks: 0, start_mode: Mode::Forage });
    let mut sim = new_simulation(&cfg, LogConfig::standard(), builder()).unwrap();
    let mut prev = sim.world().total_inventory(Good::A) + sim.world().total_inventory(Good::B);
    for _ in 0..30 {
        sim.step();
        let total = sim.world().total_inventory(Good::A) + sim.world().total_inventory(Good::B);
        assert!(total >= prev, "held goods must never shrink on a forage-only run");
        prev = total;
    }
}

#[test]
fn close_after_a_full_run_is_idempotent_regardless_of_scenario() {
    for seed in [30u64, 31] {
        let cfg = scenario(seed, 4, "barter_only");
        let mut sim = new_simulation(&cfg, LogConfig::standard(), builder()).unwrap();
        sim.run(10);
        sim.close();
        sim.close();
    }
}
