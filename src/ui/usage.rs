use std::time::Duration;

use crate::{
    ui::{
        stat_line::SingleStat,
        state::{Metric, QueryWindow, UiState},
    },
    usage::UsageHistory,
};
use ratatui::{
    buffer::Buffer, layout::Rect, macros::line as rline, macros::*, prelude::*, style::Stylize,
    widgets::*,
};
use utiltrack::{Tracker, TrackerState, Utilization};

pub struct UsageWidget<'a> {
    pub metric: Metric,
    pub usage: &'a UsageHistory,
    pub tracker: Option<&'a Tracker>,
    pub retention: Duration,
    pub focussed: bool,
    pub ui: &'a UiState,
}

impl UsageWidget<'_> {
    /// Render the smaller card version of the usage widget.
    ///
    /// ```"not rust"
    /// ╭ CPU ─ ● ᔐ ─────────────────────────────────────────────────────╮
    /// │ __________________________________________█    CPU:     4.0%   │
    /// │ avg 5s: 3.2%                                       max: 40.0%  │
    /// │                                                                │
    /// ╰───────────────────────────────────────────────── 8 cpu units ──╯
    /// ```
    fn render_card(&self, area: Rect, buf: &mut Buffer) {
        let live = !self.usage.is_empty();
        let border_color = match self.focussed {
            true => self.ui.theme.accent,
            false => self.ui.theme.primary_background,
        };
        let mut border = Block::bordered()
            .title_top(self.title_line())
            .title_top(self.status_indicator())
            .title_bottom(rline![" ", self.capacity(), " "].right_aligned())
            .border_style(Style::default().bg(self.ui.theme.surface).fg(border_color))
            .bg(self.ui.theme.surface)
            .border_type(BorderType::Rounded);
        let inner = border.inner(area);
        if live {
            border = border.title_top(self.signal_throbber());
        }
        border.render(area, buf);

        if live {
            let stat = SingleStat::new(self.ui, self.metric, self.usage, self.retention);
            let [top, middle, _] = vertical![==1, ==1, ==1].areas(inner);
            stat.render(top, buf);
            let [_, average, max, _] = horizontal![==1, *=1, ==16, ==2].areas(middle);
            self.average_line().render(average, buf);
            self.max_line().right_aligned().render(max, buf);
        } else {
            let text = Text::from("No Stats Yet");
            let area = inner.centered(
                Constraint::Length(text.width() as u16),
                Constraint::Length(1),
            );
            text.render(area, buf);
        }
    }

    /// Render the larger modal version of the usage widget.
    ///
    /// ```"not rust"
    /// ╭ CPU ─ ● ────────────────────────────╮
    /// │ Tracker                Status       │
    /// │                                     │
    /// │ Chart                               │
    /// │                                     │
    /// ╰─────────────────────────────────────╯
    /// ```
    ///
    fn render_modal(&self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let live = !self.usage.is_empty();
        let mut border = Block::bordered()
            .title(self.title_line())
            .border_style(
                Style::default()
                    .bg(self.ui.theme.surface)
                    .fg(self.ui.theme.accent),
            )
            .bg(self.ui.theme.surface)
            .border_type(BorderType::Rounded);
        if live {
            border = border.title_top(self.signal_throbber());
        }
        let inner = border.inner(area);
        border.render(area, buf);
        let inner = inner.inner(Margin::new(1, 1));
        let [info, chart_area] = vertical![>=7, *=1].areas(inner);
        let [definition, _, status] = horizontal![==1/2, ==2, ==1/2].areas(info);

        let (id, options) = match self.tracker {
            Some(t) => (t.id().to_string(), Some(t.reader().options())),
            None => ("-".to_string(), None),
        };
        let fmt_duration = |d: Option<Duration>| match d {
            Some(d) => format!("{:?}", d),
            None => "-".to_string(),
        };
        let definition_text = text!(
            self.field_line("Tracker: ", id),
            self.field_line(
                "Sampling interval: ",
                fmt_duration(options.map(|o| o.sampling_interval))
            ),
            self.field_line(
                "Calculation period: ",
                fmt_duration(options.map(|o| o.calculation_period))
            ),
            self.field_line(
                "Collection window: ",
                fmt_duration(options.map(|o| o.collection_window))
            ),
            self.field_line("Capacity: ", self.capacity()),
        );
        definition_text.render(definition, buf);

        let stats = self.tracker.map(|t| t.stats()).unwrap_or_default();
        let status_text = text!(
            self.field_line("State: ", self.tracker_state()),
            self.field_line("Ticks: ", stats.ticks.to_string()),
            self.field_line("Samples: ", stats.samples_appended.to_string()),
            self.field_line("Sampling failures: ", stats.sampling_failures.to_string()),
            self.field_line("Publish failures: ", stats.publish_failures.to_string()),
        );
        status_text.render(status, buf);

        let stat = SingleStat::new(self.ui, self.metric, self.usage, self.retention);
        let data = stat.data();
        let max = (1.2 * stat.max()).max(1.0);
        let seconds = self.retention.as_secs_f64();
        let (name, unit) = match self.metric {
            Metric::Cpu => ("CPU", "%"),
            Metric::Memory => ("RAM", "MB"),
        };
        let dataset = Dataset::default()
            .name(name)
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(
                Style::default()
                    .bg(self.ui.theme.surface)
                    .fg(self.ui.theme.secondary),
            )
            .data(&data);
        let base_style = Style::default()
            .bg(self.ui.theme.surface)
            .fg(self.ui.theme.foreground);
        let x_axis = Axis::default()
            .title("Seconds")
            .style(base_style)
            .bounds([-seconds, 0.0])
            .labels(time_labels(seconds).map(|l| rline![l]));
        let y_axis = Axis::default()
            .title(unit)
            .style(base_style)
            .bounds([0.0, max])
            .labels([
                rline!["0.0"],
                rline![format!("{:.1}", max / 2.0)],
                rline![format!("{:.1}", max)],
            ]);
        Chart::new(vec![dataset])
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(chart_area, buf);
    }

    fn field_line<'a, T: Into<Span<'a>>>(&self, label: &'a str, value: T) -> Line<'a> {
        let mut s: Span = value.into();
        if s.style.fg.is_none() {
            s = s.fg(self.ui.theme.foreground);
        }
        rline!(label.fg(self.ui.theme.primary), s)
    }

    fn window(&self) -> Option<Duration> {
        let options = self.tracker?.reader().options();
        Some(match self.ui.window {
            QueryWindow::SamplingInterval => options.sampling_interval,
            QueryWindow::CalculationPeriod => options.calculation_period,
            QueryWindow::CollectionWindow => options.collection_window,
        })
    }

    /// Pulls a fresh average from the tracker rather than the published
    /// history.
    fn average_line(&self) -> Line<'_> {
        let window = self.window();
        let averaged: Option<Utilization> = self
            .tracker
            .zip(window)
            .and_then(|(t, w)| t.utilization(w).ok());
        let label = format!("avg {}: ", fmt_window(window));
        match averaged {
            Some(u) => {
                let (value, color) = match self.metric {
                    Metric::Cpu => (
                        format!("{:.1}%", u.cpu_used_percent()),
                        self.ui.theme.load(u.cpu_used_percent()),
                    ),
                    Metric::Memory => (
                        format!("{:.1}%", u.memory_used_percent()),
                        self.ui.theme.load(u.memory_used_percent()),
                    ),
                };
                rline![label.fg(self.ui.theme.primary), value.fg(color)]
            }
            None => rline![label.fg(self.ui.theme.primary), "-"],
        }
    }

    fn max_line(&self) -> Line<'_> {
        let max = match self.metric {
            Metric::Cpu => format!("{:.1}%", self.usage.max.cpu_percent),
            Metric::Memory => format!("{:.1}MB", self.usage.max.memory_mb),
        };
        rline!["max: ".fg(self.ui.theme.primary), max]
    }

    fn capacity(&self) -> String {
        match self.tracker.map(|t| t.reader().resources()) {
            Some(r) => match self.metric {
                Metric::Cpu => format!("{} cpu units", r.guaranteed_cpu_units()),
                Metric::Memory => {
                    format!("{:.0}MB limit", r.memory_limit_bytes() as f64 / 1_000_000.0)
                }
            },
            None => "-".to_string(),
        }
    }

    fn tracker_state<'a>(&self) -> Span<'a> {
        match self.tracker.map(|t| t.state()) {
            Some(TrackerState::Created) => span!(self.ui.theme.warning; "Created"),
            Some(TrackerState::Running) => span!(self.ui.theme.success; "Running"),
            Some(TrackerState::Stopping) => span!(self.ui.theme.warning; "Stopping"),
            Some(TrackerState::Stopped) | None => span!(self.ui.theme.error; "Stopped"),
        }
    }

    fn title_line(&self) -> Line<'_> {
        let name = match self.metric {
            Metric::Cpu => "CPU",
            Metric::Memory => "MEM",
        };
        ratatui::macros::line!(" ", name.fg(self.ui.theme.primary), " ")
    }

    fn status_indicator(&self) -> Span<'_> {
        match self.tracker.map(|t| t.state()) {
            Some(TrackerState::Running) => Span::from(" ● ").fg(self.ui.theme.success),
            Some(TrackerState::Created) | Some(TrackerState::Stopping) => {
                Span::from(self.status_progress_throbber()).fg(self.ui.theme.warning)
            }
            Some(TrackerState::Stopped) | None => Span::from(" ○ ").fg(self.ui.theme.error),
        }
    }

    fn status_progress_throbber(&self) -> &'static str {
        const FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
        FRAMES[self.ui.step_of_8_in_1_second()]
    }

    fn signal_throbber(&self) -> &'static str {
        const FRAMES: [&str; 4] = ["ᔐ", "ᯇ", "ᔑ", "ᯇ"];
        let frame = self.ui.step_of_4_in_1_second();
        FRAMES[frame]
    }
}

/// Labels for an x axis running from `-seconds` to now.
fn time_labels(seconds: f64) -> [String; 3] {
    [
        format!("{:.0}", -seconds),
        format!("{:.0}", -seconds / 2.0),
        "0".to_string(),
    ]
}

fn fmt_window(window: Option<Duration>) -> String {
    match window {
        Some(w) if w.subsec_millis() == 0 => format!("{}s", w.as_secs()),
        Some(w) => format!("{}ms", w.as_millis()),
        None => "-".to_string(),
    }
}

impl<'a> Widget for UsageWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.ui.spotlit() == Some(self.metric) {
            self.render_modal(area, buf);
        } else {
            self.render_card(area, buf);
        }
    }
}
