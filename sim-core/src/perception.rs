//! Perception (§4.6): per-agent visible neighbors and resource cells,
//! snapshotted once per tick against the post-Housekeeping quote dict.

use crate::agent::Agent;
use crate::grid::{Grid, ResourceKind};
use crate::quotes::QuoteSet;
use crate::spatial::SpatialIndex;
use crate::types::{AgentId, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleAgent {
    pub agent_id: AgentId,
    pub pos: Position,
    pub quotes: QuoteSet,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleResource {
    pub pos: Position,
    pub resource: ResourceKind,
    pub amount: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerceptionCache {
    pub agents: Vec<VisibleAgent>,
    pub resources: Vec<VisibleResource>,
}

/// Populate `agent.perception_cache` from the spatial index and grid.
/// Quote snapshots are reads of the already-refreshed quote dict, so they
/// stay stable for the remainder of this tick regardless of what later
/// phases do.
pub fn perceive(agent: &mut Agent, spatial: &SpatialIndex, grid: &Grid, all_quotes: &dyn Fn(AgentId) -> QuoteSet) {
    let self_id = agent.id;
    let vision = agent.vision_radius;
    let pos = agent.pos;

    let mut visible_agents: Vec<VisibleAgent> = spatial
        .neighbors_within(pos, vision)
        .into_iter()
        .filter(|&id| id != self_id)
        .filter_map(|id| {
            spatial.position_of(id).map(|p| VisibleAgent { agent_id: id, pos: p, quotes: all_quotes(id) })
        })
        .collect();
    visible_agents.sort_by_key(|v| v.agent_id);

    let mut visible_resources: Vec<VisibleResource> = Vec::new();
    for dy in -vision..=vision {
        for dx in -vision..=vision {
            let candidate = Position::new(pos.x + dx, pos.y + dy);
            if pos.chebyshev_distance(candidate) > vision || !grid.in_bounds(candidate) {
                continue;
            }
            let cell = grid.cell(candidate);
            if let Some(resource) = cell.resource {
                if cell.amount > 0 {
                    visible_resources.push(VisibleResource { pos: candidate, resource, amount: cell.amount });
                }
            }
        }
    }
    visible_resources.sort_by_key(|r| (r.pos.x, r.pos.y));

    agent.perception_cache = PerceptionCache { agents: visible_agents, resources: visible_resources };
}
