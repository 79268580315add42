use std::time::{Duration, Instant};

use crate::{
    ui::{
        state::{Metric, UiState},
        theme::Theme,
    },
    usage::UsageHistory,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    macros::*,
    prelude::*,
    style::Stylize,
    widgets::*,
};

/// One metric's history, ready to draw as a sparkline row.
#[derive(Debug)]
pub struct SingleStat<'a> {
    name: &'static str,
    unit: &'static str,
    history: Vec<f64>,
    max: f64,
    timestamps: Vec<Instant>,
    retention: Duration,
    ui: &'a UiState,
}

impl<'a> SingleStat<'a> {
    pub fn new(ui: &'a UiState, metric: Metric, usage: &UsageHistory, retention: Duration) -> Self {
        let timestamps: Vec<Instant> = usage.points.iter().map(|p| p.timestamp).collect();
        let (name, unit, max, history) = match metric {
            // CPU is already relative to the guaranteed units.
            Metric::Cpu => (
                "CPU",
                "%",
                100.0,
                usage.points.iter().map(|p| p.cpu_percent).collect(),
            ),
            Metric::Memory => (
                "RAM",
                "MB",
                usage.max.memory_mb,
                usage.points.iter().map(|p| p.memory_mb).collect(),
            ),
        };
        Self {
            name,
            unit,
            history,
            max,
            timestamps,
            retention,
            ui,
        }
    }

    pub fn current(&self) -> Option<f64> {
        self.history.last().copied()
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Points as (seconds ago, value), oldest first, for charts.
    pub fn data(&self) -> Vec<(f64, f64)> {
        let now = Instant::now();
        std::iter::zip(&self.timestamps, &self.history)
            .map(|(x, y)| (-now.saturating_duration_since(*x).as_secs_f64(), *y))
            .collect()
    }
}

impl<'a> Widget for &SingleStat<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [_, history, _, label, current, _] =
            horizontal![==1, *=1, ==1, ==6, ==10, ==2].areas(area);
        Text::from(self.name.to_string() + ":").render(label, buf);
        let value = self.current().unwrap_or(0.0);
        let value_color = match self.unit {
            "%" => self.ui.theme.load(value),
            _ => self.ui.theme.foreground,
        };
        ratatui::macros::line![
            span![format!("{:.1}", value)].fg(value_color),
            span![format!("{:<2}", self.unit)].fg(self.ui.theme.primary_background)
        ]
        .alignment(Alignment::Right)
        .render(current, buf);
        let points: Vec<(Instant, f64)> = std::iter::zip(
            self.timestamps.iter().copied(),
            self.history.iter().copied(),
        )
        .collect();
        let start = self.ui.time.checked_sub(self.retention).unwrap_or(self.ui.time);
        let resampled: Vec<Option<u64>> = crate::resample::resample(
            &points,
            |p| p.0,
            |p| p.1,
            start,
            self.ui.time,
            history.width as usize,
        )
        .iter()
        .map(|o| o.map(|v| v.trunc() as u64))
        .collect();
        Sparkline::default()
            .data(&resampled)
            .max(((self.max * 1.1) as u64).max(1))
            .absent_value_symbol("_")
            .absent_value_style(Style::default().fg(Theme::darken(self.ui.theme.primary, 0.6)))
            .fg(self.ui.theme.primary)
            .render(history, buf);
    }
}
