//! Study/break timer driven by explicit one-second ticks.
//!
//! The timer owns no thread or runtime handle; whoever drives it calls
//! [`StudyTimer::tick`] once per second. Stopping or resetting it never
//! touches card or deck state.

use serde::{Deserialize, Serialize};

pub const DEFAULT_STUDY_SECS: u32 = 25 * 60;
pub const BREAK_SECS: u32 = 5 * 60;
/// Every Nth completed study block earns a double-length break.
pub const LONG_BREAK_EVERY: u32 = 4;

const FIVE_MINUTE_WARNING: u32 = 300;
const ONE_MINUTE_WARNING: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    Started,
    Paused,
    Reset,
    FiveMinutesLeft,
    OneMinuteLeft,
    SessionComplete { long_break: bool },
    BreakOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTimer {
    study_secs: u32,
    break_secs: u32,
    time_left: u32,
    running: bool,
    on_break: bool,
    sessions_completed: u32,
}

impl Default for StudyTimer {
    fn default() -> Self {
        Self::new(DEFAULT_STUDY_SECS)
    }
}

impl StudyTimer {
    /// Timer for study blocks of `study_secs` (at least one second).
    #[must_use]
    pub fn new(study_secs: u32) -> Self {
        let study_secs = study_secs.max(1);
        Self {
            study_secs,
            break_secs: BREAK_SECS,
            time_left: study_secs,
            running: false,
            on_break: false,
            sessions_completed: 0,
        }
    }

    #[must_use]
    pub fn study_secs(&self) -> u32 {
        self.study_secs
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_on_break(&self) -> bool {
        self.on_break
    }

    #[must_use]
    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn start(&mut self) -> Option<TimerEvent> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(TimerEvent::Started)
    }

    pub fn stop(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(TimerEvent::Paused)
    }

    /// Stops the timer and returns to the start of a study block.
    pub fn reset(&mut self) -> TimerEvent {
        self.running = false;
        self.time_left = self.study_secs;
        self.on_break = false;
        TimerEvent::Reset
    }

    /// Advances the timer by one second.
    ///
    /// When a block has already run out, the tick flips between study and
    /// break and pauses the timer so the next block starts explicitly.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }

        if self.time_left > 0 {
            self.time_left -= 1;
            if self.on_break {
                return None;
            }
            return match self.time_left {
                FIVE_MINUTE_WARNING => Some(TimerEvent::FiveMinutesLeft),
                ONE_MINUTE_WARNING => Some(TimerEvent::OneMinuteLeft),
                _ => None,
            };
        }

        self.running = false;
        if self.on_break {
            self.on_break = false;
            self.time_left = self.study_secs;
            Some(TimerEvent::BreakOver)
        } else {
            self.sessions_completed = self.sessions_completed.saturating_add(1);
            let long_break = self.sessions_completed % LONG_BREAK_EVERY == 0;
            self.time_left = if long_break {
                self.break_secs * 2
            } else {
                self.break_secs
            };
            self.on_break = true;
            Some(TimerEvent::SessionComplete { long_break })
        }
    }

    /// Seconds studied in the current block.
    #[must_use]
    pub fn elapsed_study_secs(&self) -> u32 {
        if self.on_break {
            self.study_secs
        } else {
            self.study_secs - self.time_left
        }
    }

    /// Fraction of the current block (study or break) already used.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let total = if self.on_break {
            self.break_secs
                * if self.sessions_completed % LONG_BREAK_EVERY == 0 {
                    2
                } else {
                    1
                }
        } else {
            self.study_secs
        };
        f64::from(total.saturating_sub(self.time_left)) / f64::from(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(timer: &mut StudyTimer, ticks: u32) -> Vec<TimerEvent> {
        (0..ticks).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn idle_timer_ignores_ticks() {
        let mut timer = StudyTimer::new(600);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.time_left(), 600);
    }

    #[test]
    fn study_block_warns_then_completes() {
        let mut timer = StudyTimer::new(600);
        assert_eq!(timer.start(), Some(TimerEvent::Started));
        assert_eq!(timer.start(), None);

        let events = run(&mut timer, 601);
        assert_eq!(
            events,
            vec![
                TimerEvent::FiveMinutesLeft,
                TimerEvent::OneMinuteLeft,
                TimerEvent::SessionComplete { long_break: false },
            ]
        );
        assert!(timer.is_on_break());
        assert!(!timer.is_running());
        assert_eq!(timer.time_left(), BREAK_SECS);
        assert_eq!(timer.elapsed_study_secs(), 600);
    }

    #[test]
    fn break_returns_to_study() {
        let mut timer = StudyTimer::new(10);
        timer.start();
        run(&mut timer, 11);
        timer.start();
        let events = run(&mut timer, BREAK_SECS + 1);
        assert_eq!(events, vec![TimerEvent::BreakOver]);
        assert!(!timer.is_on_break());
        assert_eq!(timer.time_left(), 10);
    }

    #[test]
    fn every_fourth_block_gets_long_break() {
        let mut timer = StudyTimer::new(5);
        let mut breaks = Vec::new();
        for _ in 0..4 {
            timer.start();
            for event in run(&mut timer, 6) {
                if let TimerEvent::SessionComplete { long_break } = event {
                    breaks.push(long_break);
                }
            }
            let pending = timer.time_left();
            timer.start();
            run(&mut timer, pending + 1);
        }
        assert_eq!(breaks, vec![false, false, false, true]);
        assert_eq!(timer.sessions_completed(), 4);
    }

    #[test]
    fn stop_and_reset() {
        let mut timer = StudyTimer::new(120);
        timer.start();
        run(&mut timer, 30);
        assert_eq!(timer.elapsed_study_secs(), 30);
        assert!((timer.progress() - 0.25).abs() < 1e-12);

        assert_eq!(timer.stop(), Some(TimerEvent::Paused));
        assert_eq!(timer.stop(), None);
        assert_eq!(timer.reset(), TimerEvent::Reset);
        assert_eq!(timer.time_left(), 120);
        assert_eq!(timer.elapsed_study_secs(), 0);
    }
}
