//! Search protocol (§4.7): ranks candidate partners/resources and emits a
//! `SetTarget` effect. Two reference protocols are provided; callers may
//! supply their own via the `SearchProtocol` trait (§6 `new_simulation`).

use rand_chacha::ChaCha8Rng;
use rand::Rng;

use crate::agent::Agent;
use crate::grid::ResourceKind;
use crate::quotes::Quote;
use crate::types::{AgentId, ExchangeRegime, Position};

/// The effect a search pass applies to one agent: a new movement/partner
/// target, or `None`/`None` for idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetIntent {
    pub target_pos: Option<Position>,
    pub target_agent_id: Option<AgentId>,
}

/// Read-only context a search protocol needs beyond the deciding agent's
/// own fields (which already carry its perception cache and quotes).
#[derive(Debug, Clone, Copy)]
pub struct SearchContext {
    pub regime: ExchangeRegime,
    pub beta: f64,
    pub epsilon: f64,
    pub forage_rate: u32,
}

pub trait SearchProtocol: std::fmt::Debug {
    fn decide(&self, agent: &Agent, ctx: &SearchContext, rng: &mut ChaCha8Rng) -> TargetIntent;
}

pub(crate) fn bilateral_surplus(mine: Quote, theirs: Quote) -> f64 {
    (mine.bid - theirs.ask).max(0.0) + (theirs.bid - mine.ask).max(0.0)
}

/// Best surplus visible between two quote sets across every pair the
/// regime allows, using whichever forward quote the pair naturally
/// exposes. Returns 0.0 if no pair is mutually quoted.
pub(crate) fn best_pair_surplus(
    mine: &crate::quotes::QuoteSet,
    theirs: &crate::quotes::QuoteSet,
    regime: ExchangeRegime,
) -> f64 {
    regime
        .allowed_pairs()
        .iter()
        .filter_map(|&pair| Some(bilateral_surplus(mine.get(pair)?, theirs.get(pair)?)))
        .fold(0.0_f64, f64::max)
}

fn best_partner_surplus(agent: &Agent, other_quotes: &crate::quotes::QuoteSet, regime: ExchangeRegime) -> f64 {
    best_pair_surplus(&agent.quotes, other_quotes, regime)
}

/// Utility gain from harvesting `min(forage_rate, amount)` of `kind`,
/// holding the other good fixed ("currently-held-good-neutral": the
/// heuristic does not special-case whichever good the agent already holds
/// more of).
fn forage_gain(agent: &Agent, kind: ResourceKind, amount: u32, forage_rate: u32) -> f64 {
    let take = forage_rate.min(amount);
    if take == 0 {
        return 0.0;
    }
    let before = agent.utility.u_goods(agent.inventory.a, agent.inventory.b);
    let after = match kind {
        ResourceKind::A => agent.utility.u_goods(agent.inventory.a + take, agent.inventory.b),
        ResourceKind::B => agent.utility.u_goods(agent.inventory.a, agent.inventory.b + take),
    };
    (after - before).max(0.0)
}

/// Default search protocol: scores every visible partner by
/// distance-discounted bilateral surplus, every visible resource by
/// distance-discounted forage-utility-gain, and targets the overall
/// argmax. A previously confirmed partner (`paired_with_id`) is retargeted
/// directly rather than rescored, since the pairing is expected to persist
/// to this tick's Matching phase (§3). Ties are broken by lower agent id;
/// between an agent-target and a forage-target tied at the same score, the
/// agent-target wins (preserving the original formula's tie order is an
/// Open Question in §9 — this is the resolved, documented choice).
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDistanceDiscountedSearch;

impl SearchProtocol for LegacyDistanceDiscountedSearch {
    fn decide(&self, agent: &Agent, ctx: &SearchContext, _rng: &mut ChaCha8Rng) -> TargetIntent {
        if let Some(partner_id) = agent.paired_with_id {
            let partner_pos = agent
                .perception_cache
                .agents
                .iter()
                .find(|v| v.agent_id == partner_id)
                .map(|v| v.pos);
            return TargetIntent { target_pos: partner_pos, target_agent_id: Some(partner_id) };
        }

        let mut best_agent: Option<(AgentId, Position, f64)> = None;
        for visible in &agent.perception_cache.agents {
            let distance = agent.pos.chebyshev_distance(visible.pos) as f64;
            let surplus = best_partner_surplus(agent, &visible.quotes, ctx.regime);
            let discounted = surplus * ctx.beta.powf(distance);
            let better = match best_agent {
                None => true,
                Some((best_id, _, best_score)) => {
                    discounted > best_score || (discounted == best_score && visible.agent_id < best_id)
                }
            };
            if better && discounted > 0.0 {
                best_agent = Some((visible.agent_id, visible.pos, discounted));
            }
        }

        let mut best_resource: Option<(Position, f64)> = None;
        for resource in &agent.perception_cache.resources {
            let distance = agent.pos.chebyshev_distance(resource.pos) as f64;
            let gain = forage_gain(agent, resource.resource, resource.amount, ctx.forage_rate);
            let discounted = gain * ctx.beta.powf(distance);
            let better = match best_resource {
                None => true,
                Some((best_pos, best_score)) => {
                    discounted > best_score
                        || (discounted == best_score && (resource.pos.x, resource.pos.y) < (best_pos.x, best_pos.y))
                }
            };
            if better && discounted > 0.0 {
                best_resource = Some((resource.pos, discounted));
            }
        }

        match (best_agent, best_resource) {
            (None, None) => TargetIntent::default(),
            (Some((id, pos, _)), None) => TargetIntent { target_pos: Some(pos), target_agent_id: Some(id) },
            (None, Some((pos, _))) => TargetIntent { target_pos: Some(pos), target_agent_id: None },
            (Some((a_id, a_pos, a_score)), Some((r_pos, r_score))) => {
                if a_score >= r_score {
                    TargetIntent { target_pos: Some(a_pos), target_agent_id: Some(a_id) }
                } else {
                    TargetIntent { target_pos: Some(r_pos), target_agent_id: None }
                }
            }
        }
    }
}

/// Picks a uniformly random visible position (excluding the agent's own)
/// via the per-agent RNG sub-stream. Honors `paired_with_id` by returning
/// an empty effect — a paired agent does not wander off before Matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWalkSearch;

impl SearchProtocol for RandomWalkSearch {
    fn decide(&self, agent: &Agent, _ctx: &SearchContext, rng: &mut ChaCha8Rng) -> TargetIntent {
        if agent.paired_with_id.is_some() {
            return TargetIntent::default();
        }
        let mut candidates: Vec<Position> = agent.perception_cache.agents.iter().map(|v| v.pos).collect();
        candidates.extend(agent.perception_cache.resources.iter().map(|r| r.pos));
        if candidates.is_empty() {
            return TargetIntent::default();
        }
        let idx = rng.random_range(0..candidates.len());
        TargetIntent { target_pos: Some(candidates[idx]), target_agent_id: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::perception::perceive;
    use crate::quotes::QuoteSet;
    use crate::spatial::SpatialIndex;
    use crate::types::{DistanceMetric, Inventory};
    use crate::utility::{Linear, Utility};
    use rand::SeedableRng;

    fn agent_with(id: AgentId, pos: Position, a: u32, b: u32) -> Agent {
        Agent::new(id, pos, Inventory::new(a, b, 0), Utility::Linear(Linear::new(1.0, 1.0).unwrap()), 1.0, 5, 1)
    }

    #[test]
    fn paired_agent_retargets_partner_without_rescoring() {
        let mut a0 = agent_with(0, Position::new(0, 0), 5, 5);
        a0.paired_with_id = Some(1);
        let mut spatial = SpatialIndex::new(DistanceMetric::Chebyshev);
        spatial.insert(0, Position::new(0, 0));
        spatial.insert(1, Position::new(1, 0));
        let grid = Grid::new(10, 10);
        perceive(&mut a0, &spatial, &grid, &|_| QuoteSet::default_unit());

        let ctx = SearchContext { regime: ExchangeRegime::Mixed, beta: 0.9, epsilon: 1e-12, forage_rate: 1 };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let intent = LegacyDistanceDiscountedSearch.decide(&a0, &ctx, &mut rng);
        assert_eq!(intent.target_agent_id, Some(1));
        assert_eq!(intent.target_pos, Some(Position::new(1, 0)));
    }

    #[test]
    fn no_visible_opportunity_yields_idle() {
        let a0 = agent_with(0, Position::new(0, 0), 5, 5);
        let ctx = SearchContext { regime: ExchangeRegime::Mixed, beta: 0.9, epsilon: 1e-12, forage_rate: 1 };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let intent = LegacyDistanceDiscountedSearch.decide(&a0, &ctx, &mut rng);
        assert_eq!(intent, TargetIntent::default());
    }

    #[test]
    fn random_walk_honors_pairing() {
        let mut a0 = agent_with(0, Position::new(0, 0), 5, 5);
        a0.paired_with_id = Some(7);
        let ctx = SearchContext { regime: ExchangeRegime::Mixed, beta: 0.9, epsilon: 1e-12, forage_rate: 1 };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let intent = RandomWalkSearch.decide(&a0, &ctx, &mut rng);
        assert_eq!(intent, TargetIntent::default());
    }
}
