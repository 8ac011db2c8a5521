//! Mode scheduler (§4.11): cycles the per-tick global `Mode` between
//! foraging-only and trading-only windows, or runs both every tick when no
//! schedule is configured.

use crate::types::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSchedule {
    pub forage_ticks: u64,
    pub trade_ticks: u64,
    pub start_mode: Mode,
}

#[derive(Debug, Clone, Copy)]
pub struct ModeScheduler {
    schedule: Option<ModeSchedule>,
}

impl ModeScheduler {
    pub fn new(schedule: Option<ModeSchedule>) -> Self {
        Self { schedule }
    }

    pub fn always_both() -> Self {
        Self { schedule: None }
    }

    /// The mode in effect at `tick`. With no schedule, every tick is
    /// `Mode::Both`. With a schedule, the period is
    /// `forage_ticks + trade_ticks`, starting at `start_mode`'s phase.
    pub fn mode_at(&self, tick: u64) -> Mode {
        let Some(schedule) = self.schedule else { return Mode::Both };
        let period = schedule.forage_ticks + schedule.trade_ticks;
        if period == 0 {
            return Mode::Both;
        }
        let offset = tick % period;
        let (first_len, first_mode, second_mode) = match schedule.start_mode {
            Mode::Forage | Mode::Both => (schedule.forage_ticks, Mode::Forage, Mode::Trade),
            Mode::Trade => (schedule.trade_ticks, Mode::Trade, Mode::Forage),
        };
        if offset < first_len { first_mode } else { second_mode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_schedule_is_always_both() {
        let scheduler = ModeScheduler::always_both();
        for tick in 0..5 {
            assert_eq!(scheduler.mode_at(tick), Mode::Both);
        }
    }

    #[test]
    fn schedule_cycles_forage_then_trade() {
        let scheduler = ModeScheduler::new(Some(ModeSchedule { forage_ticks: 3, trade_ticks: 2, start_mode: Mode::Forage }));
        let modes: Vec<Mode> = (0..10).map(|t| scheduler.mode_at(t)).collect();
        assert_eq!(
            modes,
            vec![
                Mode::Forage,
                Mode::Forage,
                Mode::Forage,
                Mode::Trade,
                Mode::Trade,
                Mode::Forage,
                Mode::Forage,
                Mode::Forage,
                Mode::Trade,
                Mode::Trade,
            ]
        );
    }

    #[test]
    fn schedule_can_start_in_trade_phase() {
        let scheduler = ModeScheduler::new(Some(ModeSchedule { forage_ticks: 2, trade_ticks: 2, start_mode: Mode::Trade }));
        let modes: Vec<Mode> = (0..4).map(|t| scheduler.mode_at(t)).collect();
        assert_eq!(modes, vec![Mode::Trade, Mode::Trade, Mode::Forage, Mode::Forage]);
    }
}
