//! Integration-level checks of the two pluggable Decision/Matching
//! protocols working together on a small hand-built neighborhood, rather
//! than each protocol's own unit tests in isolation.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sim_core::{
    Agent, DistanceMetric, ExchangeRegime, Grid, Inventory, Linear, MatchingProtocol, Position, Quote, QuoteSet,
    SearchContext, SearchProtocol, SpatialIndex, Utility,
};

fn agent_at(id: sim_core::AgentId, pos: Position, a: u32, b: u32) -> Agent {
    Agent::new(id, pos, Inventory::new(a, b, 0), Utility::Linear(Linear::new(1.0, 1.0).unwrap()), 1.0, 5, 1)
}

#[test]
fn legacy_search_then_three_pass_matching_pairs_two_mutually_interested_agents() {
    use sim_core::search::LegacyDistanceDiscountedSearch;
    use sim_core::matching::LegacyThreePassMatching;

    let mut agents = vec![agent_at(0, Position::new(0, 0), 0, 20), agent_at(1, Position::new(1, 0), 20, 0)];
    agents[0].quotes = QuoteSet {
        a_in_b: Some(Quote { ask: 3.0, bid: 3.0, p_min: 3.0, p_max: 3.0 }),
        ..QuoteSet::default_unit()
    };
    agents[1].quotes = QuoteSet {
        a_in_b: Some(Quote { ask: 1.0, bid: 1.0, p_min: 1.0, p_max: 1.0 }),
        ..QuoteSet::default_unit()
    };
    agents[0].perception_cache.agents =
        vec![sim_core::VisibleAgent { agent_id: 1, pos: Position::new(1, 0), quotes: agents[1].quotes }];
    agents[1].perception_cache.agents =
        vec![sim_core::VisibleAgent { agent_id: 0, pos: Position::new(0, 0), quotes: agents[0].quotes }];

    let ctx = SearchContext { regime: ExchangeRegime::BarterOnly, beta: 0.9, epsilon: 1e-12, forage_rate: 1 };
    let mut rng0 = ChaCha8Rng::seed_from_u64(1);
    let mut rng1 = ChaCha8Rng::seed_from_u64(2);
    let intent0 = LegacyDistanceDiscountedSearch.decide(&agents[0], &ctx, &mut rng0);
    let intent1 = LegacyDistanceDiscountedSearch.decide(&agents[1], &ctx, &mut rng1);
    assert_eq!(intent0.target_agent_id, Some(1));
    assert_eq!(intent1.target_agent_id, Some(0));
    agents[0].target_agent_id = intent0.target_agent_id;
    agents[1].target_agent_id = intent1.target_agent_id;

    let pairs = LegacyThreePassMatching.match_agents(&mut agents, DistanceMetric::Chebyshev, ExchangeRegime::BarterOnly, 1, 0);
    assert_eq!(pairs, vec![(0, 1)]);
}

#[test]
fn search_prefers_forage_target_when_no_agent_surplus_is_available() {
    use sim_core::search::LegacyDistanceDiscountedSearch;

    let mut grid = Grid::new(5, 5);
    grid.seed_cell(Position::new(2, 0), sim_core::ResourceKind::A, 5);
    let mut spatial = SpatialIndex::new(DistanceMetric::Chebyshev);
    let mut agent = agent_at(0, Position::new(0, 0), 0, 20);
    spatial.insert(0, agent.pos);
    sim_core::perceive(&mut agent, &spatial, &grid, &|_| QuoteSet::default_unit());

    let ctx = SearchContext { regime: ExchangeRegime::BarterOnly, beta: 0.9, epsilon: 1e-12, forage_rate: 1 };
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let intent = LegacyDistanceDiscountedSearch.decide(&agent, &ctx, &mut rng);
    assert_eq!(intent.target_pos, Some(Position::new(2, 0)));
    assert_eq!(intent.target_agent_id, None);
}
