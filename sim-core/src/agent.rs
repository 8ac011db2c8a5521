//! Agent representation (§3).

use std::collections::HashMap;

use crate::perception::PerceptionCache;
use crate::quotes::QuoteSet;
use crate::types::{AgentId, Inventory, Position};
use crate::utility::Utility;

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub pos: Position,
    pub inventory: Inventory,
    pub utility: Utility,
    pub lambda_money: f64,
    pub quotes: QuoteSet,
    pub vision_radius: i32,
    pub move_budget_per_tick: i32,

    pub target_pos: Option<Position>,
    pub target_agent_id: Option<AgentId>,
    pub paired_with_id: Option<AgentId>,
    pub trade_cooldowns: HashMap<AgentId, u64>,

    /// Set on any inventory mutation; cleared by Housekeeping after quotes
    /// are recomputed (§3, §4.3). Starts `true` so every agent gets a
    /// Housekeeping quote pass on tick 0 even though nothing has "changed".
    pub inventory_changed: bool,

    pub perception_cache: PerceptionCache,
}

impl Agent {
    pub fn new(
        id: AgentId,
        pos: Position,
        inventory: Inventory,
        utility: Utility,
        lambda_money: f64,
        vision_radius: i32,
        move_budget_per_tick: i32,
    ) -> Self {
        Self {
            id,
            pos,
            inventory,
            utility,
            lambda_money,
            quotes: QuoteSet::default_unit(),
            vision_radius,
            move_budget_per_tick,
            target_pos: None,
            target_agent_id: None,
            paired_with_id: None,
            trade_cooldowns: HashMap::new(),
            inventory_changed: true,
            perception_cache: PerceptionCache::default(),
        }
    }

    pub fn is_in_cooldown_with(&self, other: AgentId, tick: u64) -> bool {
        self.trade_cooldowns.get(&other).is_some_and(|&expires| tick < expires)
    }

    pub fn set_cooldown(&mut self, other: AgentId, until_tick: u64) {
        self.trade_cooldowns.insert(other, until_tick);
    }

    pub fn mark_inventory_changed(&mut self) {
        self.inventory_changed = true;
    }
}
