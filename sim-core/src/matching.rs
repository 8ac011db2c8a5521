//! Matching protocol (§4.8): turns each agent's `target_agent_id` into at
//! most one confirmed `paired_with_id` per tick, in three passes. Agents
//! are addressed by dense index (`AgentId` doubles as the slice index, as
//! everywhere else in the tick driver).

use crate::agent::Agent;
use crate::search::best_pair_surplus;
use crate::types::{AgentId, DistanceMetric, ExchangeRegime};

pub trait MatchingProtocol: std::fmt::Debug {
    fn match_agents(
        &self,
        agents: &mut [Agent],
        metric: DistanceMetric,
        regime: ExchangeRegime,
        interaction_radius: i32,
        tick: u64,
    ) -> Vec<(AgentId, AgentId)>;
}

fn within_interaction_range(agents: &[Agent], metric: DistanceMetric, i: AgentId, j: AgentId, radius: i32) -> bool {
    let pi = agents[i as usize].pos;
    let pj = agents[j as usize].pos;
    metric.distance(pi, pj) <= radius
}

fn mutually_uncooled(agents: &[Agent], i: AgentId, j: AgentId, tick: u64) -> bool {
    !agents[i as usize].is_in_cooldown_with(j, tick) && !agents[j as usize].is_in_cooldown_with(i, tick)
}

fn confirm_pair(agents: &mut [Agent], i: AgentId, j: AgentId, out: &mut Vec<(AgentId, AgentId)>) {
    agents[i as usize].paired_with_id = Some(j);
    agents[j as usize].paired_with_id = Some(i);
    out.push((i.min(j), i.max(j)));
}

/// Three-pass reference matcher, in spec order:
///
/// 1. Mutual: both agents target each other.
/// 2. Greedy: agent targets an as-yet-unpaired agent (one-directional).
/// 3. Opportunistic: agent has no confirmed target; scan its visible
///    unpaired agents in id order and pair on the first reservation-band
///    overlap under any regime-permitted pair.
///
/// All three passes iterate agent ids ascending, so ties are always
/// resolved in favor of the lower id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyThreePassMatching;

impl MatchingProtocol for LegacyThreePassMatching {
    fn match_agents(
        &self,
        agents: &mut [Agent],
        metric: DistanceMetric,
        regime: ExchangeRegime,
        interaction_radius: i32,
        tick: u64,
    ) -> Vec<(AgentId, AgentId)> {
        let n = agents.len() as AgentId;
        let mut pairs = Vec::new();

        // Pass 1: mutual.
        for i in 0..n {
            if agents[i as usize].paired_with_id.is_some() {
                continue;
            }
            let Some(j) = agents[i as usize].target_agent_id else { continue };
            if j >= n || i == j || agents[j as usize].paired_with_id.is_some() {
                continue;
            }
            if agents[j as usize].target_agent_id != Some(i) {
                continue;
            }
            if !within_interaction_range(agents, metric, i, j, interaction_radius) {
                continue;
            }
            if !mutually_uncooled(agents, i, j, tick) {
                continue;
            }
            confirm_pair(agents, i, j, &mut pairs);
        }

        // Pass 2: greedy, one-directional.
        for i in 0..n {
            if agents[i as usize].paired_with_id.is_some() {
                continue;
            }
            let Some(j) = agents[i as usize].target_agent_id else { continue };
            if j >= n || i == j || agents[j as usize].paired_with_id.is_some() {
                continue;
            }
            if !within_interaction_range(agents, metric, i, j, interaction_radius) {
                continue;
            }
            if !mutually_uncooled(agents, i, j, tick) {
                continue;
            }
            confirm_pair(agents, i, j, &mut pairs);
        }

        // Pass 3: opportunistic, first regime-permitted overlap among
        // visible unpaired agents, scanned in ascending id order.
        for i in 0..n {
            if agents[i as usize].paired_with_id.is_some() {
                continue;
            }
            let visible: Vec<AgentId> =
                agents[i as usize].perception_cache.agents.iter().map(|v| v.agent_id).collect();
            for j in visible {
                if agents[j as usize].paired_with_id.is_some() {
                    continue;
                }
                if !within_interaction_range(agents, metric, i, j, interaction_radius) {
                    continue;
                }
                if !mutually_uncooled(agents, i, j, tick) {
                    continue;
                }
                let surplus = best_pair_surplus(&agents[i as usize].quotes, &agents[j as usize].quotes, regime);
                if surplus > 0.0 {
                    confirm_pair(agents, i, j, &mut pairs);
                    break;
                }
            }
        }

        pairs
    }
}
