use ratatui::{prelude::*, widgets::*};
use utiltrack::Tracker;

use crate::ui::state::{Focussable, UiState};

/// Side panel with the tracker's internals, toggled with `d`.
pub struct DebugWidget<'a> {
    pub ui: &'a UiState,
    pub tracker: Option<&'a Tracker>,
}

impl DebugWidget<'_> {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let Some(tracker) = self.tracker else {
            return vec![("tracker", "none".to_string())];
        };
        let reader = tracker.reader();
        let options = reader.options();
        let resources = reader.resources();
        let stats = tracker.stats();
        vec![
            ("id", tracker.id().to_string()),
            ("state", tracker.state().to_string()),
            ("interval", format!("{:?}", options.sampling_interval)),
            ("period", format!("{:?}", options.calculation_period)),
            ("window", format!("{:?}", options.collection_window)),
            ("cpu units", resources.guaranteed_cpu_units().to_string()),
            ("memory", format!("{} B", resources.memory_limit_bytes())),
            (
                "history",
                format!("{}/{}", reader.history_len(), options.history_capacity()),
            ),
            ("ticks", stats.ticks.to_string()),
            ("appended", stats.samples_appended.to_string()),
            ("sample errs", stats.sampling_failures.to_string()),
            ("publish errs", stats.publish_failures.to_string()),
            ("focus", format!("{:?}", self.ui.focus)),
            ("query", format!("{:?}", self.ui.window)),
        ]
    }
}

impl Widget for DebugWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = match self.ui.focus {
            Some(Focussable::Debug) => self.ui.theme.accent,
            _ => self.ui.theme.foreground,
        };
        let panel_style = Style::default()
            .bg(self.ui.theme.surface)
            .fg(self.ui.theme.foreground);
        let rows = self.rows().into_iter().map(|(name, value)| {
            Row::new([
                Cell::from(name).style(Style::default().fg(self.ui.theme.primary)),
                Cell::from(value),
            ])
        });
        let table = Table::new(rows, [Constraint::Length(12), Constraint::Fill(1)])
            .block(
                Block::bordered()
                    .title("Debug")
                    .border_style(Style::default().fg(border_color))
                    .border_type(BorderType::Rounded),
            )
            .style(panel_style);
        // Table is also a StatefulWidget.
        Widget::render(table, area, buf);
    }
}
