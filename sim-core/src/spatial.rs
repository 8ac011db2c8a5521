//! Spatial index (§4.4): position → agents and agent → position, answering
//! radius queries in time proportional to the cells scanned, not the whole
//! population.

use std::collections::{BTreeSet, HashMap};

use crate::types::{AgentId, DistanceMetric, Position};

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    metric: DistanceMetric,
    by_position: HashMap<Position, BTreeSet<AgentId>>,
    by_agent: HashMap<AgentId, Position>,
}

impl SpatialIndex {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric, by_position: HashMap::new(), by_agent: HashMap::new() }
    }

    pub fn insert(&mut self, agent: AgentId, pos: Position) {
        self.by_position.entry(pos).or_default().insert(agent);
        self.by_agent.insert(agent, pos);
    }

    pub fn remove(&mut self, agent: AgentId) {
        if let Some(pos) = self.by_agent.remove(&agent) {
            if let Some(set) = self.by_position.get_mut(&pos) {
                set.remove(&agent);
                if set.is_empty() {
                    self.by_position.remove(&pos);
                }
            }
        }
    }

    pub fn update_position(&mut self, agent: AgentId, new_pos: Position) {
        self.remove(agent);
        self.insert(agent, new_pos);
    }

    pub fn position_of(&self, agent: AgentId) -> Option<Position> {
        self.by_agent.get(&agent).copied()
    }

    pub fn agents_at(&self, pos: Position) -> impl Iterator<Item = AgentId> + '_ {
        self.by_position.get(&pos).into_iter().flatten().copied()
    }

    /// Agent ids within radius `r` of `pos`, sorted ascending for
    /// determinism. Scans the bounding box under the fixed metric rather
    /// than every known position.
    pub fn neighbors_within(&self, pos: Position, r: i32) -> Vec<AgentId> {
        let mut result: BTreeSet<AgentId> = BTreeSet::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let candidate = Position::new(pos.x + dx, pos.y + dy);
                if self.metric.distance(pos, candidate) > r {
                    continue;
                }
                if let Some(set) = self.by_position.get(&candidate) {
                    result.extend(set.iter().copied());
                }
            }
        }
        result.into_iter().collect()
    }
}
