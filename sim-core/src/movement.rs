//! Movement (§4.10): each agent steps at most `move_budget_per_tick` single
//! cells toward `target_pos`, greedily minimizing Chebyshev distance.

use crate::agent::Agent;
use crate::grid::Grid;
use crate::spatial::SpatialIndex;
use crate::types::Position;

/// Candidate single-cell steps in deterministic tie-break order: among steps
/// that reduce the Chebyshev distance to `to` the most, prefer lower `Δy`,
/// then lower `Δx` (§4.10).
fn best_step(from: Position, to: Position) -> Position {
    let steps = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];
    let mut best: Option<(Position, i32, (i32, i32))> = None;
    for &(dx, dy) in &steps {
        let candidate = Position::new(from.x + dx, from.y + dy);
        let distance = candidate.chebyshev_distance(to);
        let key = (dy, dx);
        let better = match &best {
            None => true,
            Some((_, best_distance, best_key)) => distance < *best_distance || (distance == *best_distance && key < *best_key),
        };
        if better {
            best = Some((candidate, distance, key));
        }
    }
    match best {
        Some((pos, _, _)) => pos,
        None => from,
    }
}

/// Moves one agent toward its target, updating both the agent's own
/// position and the shared spatial index. No-op if the agent has no
/// target or is already there. Co-location with other (non-paired) agents
/// is permitted.
pub fn move_agent(agent: &mut Agent, grid: &Grid, spatial: &mut SpatialIndex) {
    let Some(target) = agent.target_pos else { return };
    let mut pos = agent.pos;
    for _ in 0..agent.move_budget_per_tick.max(0) {
        if pos == target {
            break;
        }
        let next = best_step(pos, target);
        if !grid.in_bounds(next) {
            break;
        }
        pos = next;
    }
    if pos != agent.pos {
        agent.pos = pos;
        spatial.update_position(agent.id, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DistanceMetric, Inventory};
    use crate::utility::{Linear, Utility};

    fn test_agent(pos: Position, target: Position, budget: i32) -> Agent {
        let mut a = Agent::new(0, pos, Inventory::new(0, 0, 0), Utility::Linear(Linear::new(1.0, 1.0).unwrap()), 1.0, 5, budget);
        a.target_pos = Some(target);
        a
    }

    #[test]
    fn moves_diagonally_toward_target_when_budget_allows() {
        let grid = Grid::new(20, 20);
        let mut spatial = SpatialIndex::new(DistanceMetric::Chebyshev);
        spatial.insert(0, Position::new(0, 0));
        let mut agent = test_agent(Position::new(0, 0), Position::new(5, 5), 3);
        move_agent(&mut agent, &grid, &mut spatial);
        assert_eq!(agent.pos, Position::new(3, 3));
        assert_eq!(spatial.position_of(0), Some(Position::new(3, 3)));
    }

    #[test]
    fn stops_at_target_without_overshooting() {
        let grid = Grid::new(20, 20);
        let mut spatial = SpatialIndex::new(DistanceMetric::Chebyshev);
        spatial.insert(0, Position::new(0, 0));
        let mut agent = test_agent(Position::new(0, 0), Position::new(1, 0), 5);
        move_agent(&mut agent, &grid, &mut spatial);
        assert_eq!(agent.pos, Position::new(1, 0));
    }

    #[test]
    fn no_target_is_a_no_op() {
        let grid = Grid::new(20, 20);
        let mut spatial = SpatialIndex::new(DistanceMetric::Chebyshev);
        spatial.insert(0, Position::new(2, 2));
        let mut agent = Agent::new(0, Position::new(2, 2), Inventory::new(0, 0, 0), Utility::Linear(Linear::new(1.0, 1.0).unwrap()), 1.0, 5, 3);
        move_agent(&mut agent, &grid, &mut spatial);
        assert_eq!(agent.pos, Position::new(2, 2));
    }

    #[test]
    fn never_steps_out_of_bounds() {
        let grid = Grid::new(5, 5);
        let mut spatial = SpatialIndex::new(DistanceMetric::Chebyshev);
        spatial.insert(0, Position::new(0, 0));
        let mut agent = test_agent(Position::new(0, 0), Position::new(-10, -10), 3);
        move_agent(&mut agent, &grid, &mut spatial);
        assert_eq!(agent.pos, Position::new(0, 0));
    }
}
