use std::time::Duration;

use crate::{
    ui::{
        debug::DebugWidget,
        state::{Focussable, Metric, UiState},
        usage::UsageWidget,
    },
    usage::UsageHistory,
};
use ratatui::{buffer::Buffer, layout::Rect, macros::*, prelude::*, widgets::*};
use tui_logger::*;
use utiltrack::Tracker;

pub struct DashboardWidget<'a> {
    pub ui: &'a UiState,
    pub usage: &'a UsageHistory,
    pub tracker: Option<&'a Tracker>,
    pub retention: Duration,
}

impl<'a> Widget for &mut DashboardWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let [window_rect, log_rect] = vertical![>=5, ==10].areas(area);

        let panel_style = Style::default()
            .bg(self.ui.theme.surface)
            .fg(self.ui.theme.foreground);

        let main_rect = if self.ui.debug {
            let [main_rect, panel_rect] = horizontal![>=5, >=30].areas(window_rect);
            DebugWidget {
                ui: self.ui,
                tracker: self.tracker,
            }
            .render(panel_rect, buf);
            main_rect
        } else {
            window_rect
        };

        let border_color = match self.ui.focus {
            Some(Focussable::Logs) => self.ui.theme.accent,
            _ => self.ui.theme.foreground,
        };
        TuiLoggerSmartWidget::default()
            .style_error(panel_style.fg(self.ui.theme.error))
            .style_debug(panel_style)
            .style_warn(panel_style.fg(self.ui.theme.warning))
            .style_trace(panel_style)
            .style_info(panel_style)
            .style(panel_style)
            .border_style(panel_style.fg(border_color))
            .output_separator(':')
            .output_timestamp(Some("%H:%M:%S".to_string()))
            .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
            .output_target(true)
            .output_file(false)
            .output_line(false)
            .state(&self.ui.logger_state)
            .render(log_rect, buf);

        let main_style = Style::default()
            .bg(self.ui.theme.background)
            .fg(self.ui.theme.foreground);
        Block::new().style(main_style).render(main_rect, buf);

        let horizontal = Layout::horizontal(Metric::ALL.map(|_| Constraint::Fill(1)))
            .spacing(1)
            .horizontal_margin(1);
        let [row] = vertical![==5].margin(1).areas(main_rect);
        let cells = horizontal.split(row);
        for (metric, area) in Metric::ALL.into_iter().zip(cells.iter()) {
            let focussed = self.ui.focus == Some(Focussable::Card(metric));
            if focussed && self.ui.spotlit().is_some() {
                continue;
            }
            self.card(metric, focussed).render(*area, buf);
        }

        if let Some(metric) = self.ui.spotlit() {
            self.card(metric, true)
                .render(main_rect.inner(Margin::new(2, 2)), buf);
        }
    }
}

impl<'a> DashboardWidget<'a> {
    fn card(&self, metric: Metric, focussed: bool) -> UsageWidget<'a> {
        UsageWidget {
            metric,
            usage: self.usage,
            tracker: self.tracker,
            retention: self.retention,
            focussed,
            ui: self.ui,
        }
    }
}
