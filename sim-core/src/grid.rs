//! Grid and resources (§4.5).
//!
//! Regeneration scans only the harvested active set — positions whose
//! `amount` has fallen below `original_amount` — so an untouched N×N grid
//! costs nothing per tick regardless of N.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub resource: Option<ResourceKind>,
    pub amount: u32,
    pub original_amount: u32,
    pub last_harvested_tick: Option<u64>,
}

impl Cell {
    pub fn empty() -> Self {
        Self { resource: None, amount: 0, original_amount: 0, last_harvested_tick: None }
    }

    pub fn seeded(resource: ResourceKind, amount: u32) -> Self {
        Self { resource: Some(resource), amount, original_amount: amount, last_harvested_tick: None }
    }

    fn is_below_original(&self) -> bool {
        self.amount < self.original_amount
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    /// Positions with `amount < original_amount`. Ordered so regeneration
    /// and snapshot iteration are deterministic.
    active_set: BTreeSet<(i32, i32)>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::empty(); (width.max(0) as usize) * (height.max(0) as usize)],
            active_set: BTreeSet::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[self.index(pos)]
    }

    /// Seed a cell at construction time (scenario setup only — does not
    /// touch the active set since a freshly seeded cell is at capacity).
    pub fn seed_cell(&mut self, pos: Position, resource: ResourceKind, amount: u32) {
        let idx = self.index(pos);
        self.cells[idx] = Cell::seeded(resource, amount);
    }

    /// Harvest up to `requested` units from `pos`, returning the amount
    /// actually taken. Stamps `last_harvested_tick` and (re)inserts the
    /// position into the active set.
    pub fn harvest(&mut self, pos: Position, requested: u32, tick: u64) -> u32 {
        let idx = self.index(pos);
        let cell = &mut self.cells[idx];
        let taken = requested.min(cell.amount);
        cell.amount -= taken;
        cell.last_harvested_tick = Some(tick);
        if cell.is_below_original() {
            self.active_set.insert((pos.x, pos.y));
        }
        taken
    }

    /// Advance regeneration by one tick, scanning only the active set.
    pub fn regenerate(&mut self, tick: u64, growth_rate: u32, max_amount: u32, regen_cooldown: u64) {
        let mut restored = Vec::new();
        for &(x, y) in &self.active_set {
            let idx = self.index(Position::new(x, y));
            let cell = &mut self.cells[idx];
            let last = cell.last_harvested_tick.unwrap_or(0);
            if tick.saturating_sub(last) >= regen_cooldown {
                let cap = max_amount.min(cell.original_amount);
                cell.amount = (cell.amount + growth_rate).min(cap);
                if !cell.is_below_original() {
                    restored.push((x, y));
                }
            }
        }
        for key in restored {
            self.active_set.remove(&key);
        }
    }

    pub fn active_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.active_set.iter().map(|&(x, y)| Position::new(x, y))
    }

    /// All cells holding a resource, in row-major order — used for
    /// deterministic resource-snapshot telemetry regardless of active-set
    /// membership.
    pub fn resource_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }
}
