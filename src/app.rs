use std::{path::PathBuf, time::Instant};

use crate::{
    config::{ConfigManager, UtiltrackConfig},
    event::{AppEvent, Event, EventHandler},
    ui::{dashboard::DashboardWidget, state::UiState},
    usage::{UsageHistory, UsagePoint},
};
use color_eyre::eyre::Result;
use log::*;
use ratatui::{
    DefaultTerminal,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
};
use sysinfo::Pid;
use tui_logger::*;
use utiltrack::{ChannelPublisher, LogPublisher, SysinfoSource, Tracker, UtilizationPublisher};

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: ConfigManager,
    pub pid: Option<u32>,
    pub tracker: Option<Tracker>,
    pub usage: UsageHistory,
    pub ui_state: UiState,
}

impl App {
    pub fn new(config_path: PathBuf, pid: Option<u32>) -> Result<Self> {
        let events = EventHandler::new();
        let sender = events.clone_sender();
        let config = ConfigManager::new(config_path, sender)?;
        let usage = UsageHistory::new(config.current().history());
        Ok(Self {
            running: true,
            events,
            config,
            pid,
            tracker: None,
            usage,
            ui_state: UiState::default(),
        })
    }

    /// Run the application's main loop.
    pub async fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        if let Err(err) = self.start(self.config.current()) {
            error!(target: "App", "Failed to start: {}", err);
        }
        while self.running {
            terminal.draw(|frame| {
                let mut dashboard = DashboardWidget {
                    ui: &self.ui_state,
                    usage: &self.usage,
                    tracker: self.tracker.as_ref(),
                    retention: self.config.current().history(),
                };
                frame.render_widget(&mut dashboard, frame.area());
            })?;
            match self.events.next().await? {
                Event::Tick => self.ui_state.tick(),
                Event::Crossterm(event) => match event {
                    crossterm::event::Event::Key(key_event)
                        if key_event.kind == crossterm::event::KeyEventKind::Press =>
                    {
                        self.handle_key_events(key_event)?
                    }
                    _ => {}
                },
                Event::App(app_event) => match app_event {
                    AppEvent::Reload => self.reload_config().await,
                    AppEvent::Quit => self.quit(),
                    AppEvent::Utilization(utilization) => self
                        .usage
                        .push(UsagePoint::new(Instant::now(), &utilization)),
                },
            }
        }
        self.stop_tracker().await;
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn handle_key_events(&mut self, key_event: KeyEvent) -> Result<()> {
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => self.events.send(AppEvent::Quit),
            KeyCode::Char('c' | 'C') if key_event.modifiers == KeyModifiers::CONTROL => {
                self.events.send(AppEvent::Quit)
            }
            KeyCode::Char('r') => self.events.send(AppEvent::Reload),
            KeyCode::Char('d') => self.ui_state.toggle_debug(),
            KeyCode::Char('w') => self.ui_state.cycle_window(),
            KeyCode::Tab => self.ui_state.focus_next(),
            KeyCode::BackTab => self.ui_state.focus_prev(),
            KeyCode::Enter => self.ui_state.toggle_spotlight(),
            KeyCode::PageUp => self.ui_state.logger_state.transition(TuiWidgetEvent::PrevPageKey),
            KeyCode::PageDown => self.ui_state.logger_state.transition(TuiWidgetEvent::NextPageKey),
            _ => {}
        }
        Ok(())
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }

    /// Trackers are single use, so a reload replaces the running one. A
    /// config that fails to load leaves the current tracker alone.
    async fn reload_config(&mut self) {
        debug!(target: "App", "Reload!");
        match self.config.reload() {
            Ok(config) => {
                self.stop_tracker().await;
                if let Err(e) = self.start(config) {
                    error!(target: "App", "{}", e);
                }
            }
            Err(e) => error!(target: "App", "{}", e),
        }
    }

    /// Build and start a tracker for the configured process.
    fn start(&mut self, config: UtiltrackConfig) -> Result<()> {
        let source = match self.pid {
            Some(pid) => SysinfoSource::for_pid(Pid::from_u32(pid), config.resources)?,
            None => SysinfoSource::current(config.resources)?,
        };
        let mut publishers: Vec<Box<dyn UtilizationPublisher>> = vec![Box::new(
            ChannelPublisher::new("dashboard", self.events.clone_sender(), |u| {
                Event::App(AppEvent::Utilization(u))
            }),
        )];
        if config.log_publisher {
            publishers.push(Box::new(LogPublisher));
        }
        let mut tracker = Tracker::new(config.tracker, source, publishers)?;
        tracker.start()?;
        self.usage.set_retention(config.history());
        self.tracker = Some(tracker);
        Ok(())
    }

    async fn stop_tracker(&mut self) {
        if let Some(mut tracker) = self.tracker.take()
            && let Err(e) = tracker.stop().await
        {
            warn!(target: "App", "{}", e);
        }
    }
}
