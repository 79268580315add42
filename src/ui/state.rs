use std::{fmt::Debug, time::Instant};

use crate::{event::TICK_FPS, ui::theme::Theme};
use tui_logger::*;

/// The two metric cards, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Memory,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Cpu, Metric::Memory];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focussable {
    Card(Metric),
    Logs,
    Debug,
}

/// The main UI mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Both cards and logs
    Dashboard,
    /// Chart of the focussed card
    Spotlight,
}

/// Which tracker window the cards average over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryWindow {
    SamplingInterval,
    CalculationPeriod,
    CollectionWindow,
}

impl QueryWindow {
    fn next(self) -> Self {
        match self {
            QueryWindow::SamplingInterval => QueryWindow::CalculationPeriod,
            QueryWindow::CalculationPeriod => QueryWindow::CollectionWindow,
            QueryWindow::CollectionWindow => QueryWindow::SamplingInterval,
        }
    }
}

pub struct UiState {
    pub tick: f64,
    pub time: Instant,
    pub theme: Theme,
    pub focus: Option<Focussable>,
    pub mode: Mode,
    pub window: QueryWindow,
    pub debug: bool,
    pub logger_state: TuiWidgetState,
}

impl Debug for UiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiState")
            .field("tick", &self.tick)
            .field("time", &self.time)
            .field("mode", &self.mode)
            .field("focus", &self.focus)
            .field("window", &self.window)
            .finish()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            logger_state: TuiWidgetState::new(),
            tick: Default::default(),
            time: Instant::now(),
            theme: Theme::dark(),
            mode: Mode::Dashboard,
            focus: None,
            window: QueryWindow::CalculationPeriod,
            debug: false,
        }
    }
}

impl UiState {
    pub fn tick(&mut self) {
        self.tick += 1.0;
        if self.tick > 2.0 * TICK_FPS {
            self.tick = 0.0;
            self.time = Instant::now();
        }
    }

    pub fn step_of_8_in_1_second(&self) -> usize {
        (self.tick * 8.0 / TICK_FPS) as usize % 8
    }

    pub fn step_of_4_in_1_second(&self) -> usize {
        (self.tick * 4.0 / TICK_FPS) as usize % 4
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
        if !self.debug
            && let Some(Focussable::Debug) = &self.focus
        {
            self.focus = Some(Focussable::Card(Metric::Cpu));
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match &self.focus {
            None => Some(Focussable::Card(Metric::Cpu)),
            Some(Focussable::Card(Metric::Cpu)) => Some(Focussable::Card(Metric::Memory)),
            Some(Focussable::Card(Metric::Memory)) => Some(Focussable::Logs),
            Some(Focussable::Logs) => {
                if self.debug {
                    Some(Focussable::Debug)
                } else {
                    Some(Focussable::Card(Metric::Cpu))
                }
            }
            Some(Focussable::Debug) => Some(Focussable::Card(Metric::Cpu)),
        }
    }

    pub fn focus_prev(&mut self) {
        self.focus = match &self.focus {
            None => Some(Focussable::Card(Metric::Cpu)),
            Some(Focussable::Card(Metric::Cpu)) => {
                if self.debug {
                    Some(Focussable::Debug)
                } else {
                    Some(Focussable::Logs)
                }
            }
            Some(Focussable::Card(Metric::Memory)) => Some(Focussable::Card(Metric::Cpu)),
            Some(Focussable::Logs) => Some(Focussable::Card(Metric::Memory)),
            Some(Focussable::Debug) => Some(Focussable::Logs),
        }
    }

    /// Spotlight only applies to a focussed card.
    pub fn toggle_spotlight(&mut self) {
        if self.mode == Mode::Spotlight {
            self.mode = Mode::Dashboard;
        } else if let Some(Focussable::Card(_)) = &self.focus {
            self.mode = Mode::Spotlight;
        }
    }

    pub fn cycle_window(&mut self) {
        self.window = self.window.next();
    }

    pub fn spotlit(&self) -> Option<Metric> {
        match (&self.mode, &self.focus) {
            (Mode::Spotlight, Some(Focussable::Card(metric))) => Some(*metric),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKS_AND_STEPS: [(usize, usize, usize); 13] = [
        (0, 0, 0),
        (1, 0, 0),
        (2, 0, 0),
        (1, 0, 1),
        (3, 0, 1),
        (1, 1, 2),
        (3, 1, 2),
        (1, 1, 3),
        (2, 1, 3),
        (1, 2, 4),
        (15, 0, 0),
        (15, 2, 4),
        (15, 0, 0),
    ];

    #[test]
    fn all_the_throbs() {
        let mut t = UiState::default();
        let mut c = 0;
        for (ticks, s4i1, s8i1) in TICKS_AND_STEPS {
            for _ in 0..ticks {
                t.tick();
                c += 1;
            }
            assert_eq!(
                t.step_of_4_in_1_second(),
                s4i1,
                "After {} ticks, 4/1 should be {}",
                c,
                s4i1
            );
            assert_eq!(
                t.step_of_8_in_1_second(),
                s8i1,
                "After {} ticks, 8/1 should be {}",
                c,
                s8i1
            );
        }
    }

    #[test]
    fn focus_cycles_through_cards_and_logs() {
        let mut ui = UiState::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            ui.focus_next();
            seen.push(ui.focus.clone());
        }
        assert_eq!(
            seen,
            vec![
                Some(Focussable::Card(Metric::Cpu)),
                Some(Focussable::Card(Metric::Memory)),
                Some(Focussable::Logs),
                Some(Focussable::Card(Metric::Cpu)),
            ]
        );
        ui.focus_prev();
        assert_eq!(ui.focus, Some(Focussable::Logs));
    }

    #[test]
    fn debug_pane_joins_the_cycle() {
        let mut ui = UiState::default();
        ui.toggle_debug();
        ui.focus = Some(Focussable::Logs);
        ui.focus_next();
        assert_eq!(ui.focus, Some(Focussable::Debug));
        ui.toggle_debug();
        assert_eq!(ui.focus, Some(Focussable::Card(Metric::Cpu)));
    }

    #[test]
    fn spotlight_needs_a_card() {
        let mut ui = UiState::default();
        ui.toggle_spotlight();
        assert_eq!(ui.mode, Mode::Dashboard);
        ui.focus = Some(Focussable::Card(Metric::Memory));
        ui.toggle_spotlight();
        assert_eq!(ui.spotlit(), Some(Metric::Memory));
        ui.toggle_spotlight();
        assert_eq!(ui.spotlit(), None);
    }

    #[test]
    fn window_cycles() {
        let mut ui = UiState::default();
        assert_eq!(ui.window, QueryWindow::CalculationPeriod);
        ui.cycle_window();
        ui.cycle_window();
        assert_eq!(ui.window, QueryWindow::SamplingInterval);
    }
}
