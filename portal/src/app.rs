use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, EventStream, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use portal_api::ServiceClients;
use portal_auth::{AuthContext, AuthEvent};

use crate::app_core::{AppCore, DataEventHandler};
use crate::background::geolocation::GeoLocator;
use crate::background::{data_loader::DataLoader, BackgroundTaskManager};
use crate::commands::executor;
use crate::config::AppConfig;
use crate::events::{AppCommand, DataEvent};
use crate::input::KeyEvent;
use crate::log_buffer::LogBuffer;
use crate::logging::init_logging_with_buffer;
use crate::state::otp::OtpPolicy;
use crate::state::{AppState, Route};

const LOG_BUFFER_SIZE: usize = 5000;

type Tui = Terminal<CrosstermBackend<std::io::Stdout>>;

/// Production handler: real data loader and background tasks.
struct TaskRunner {
    task_manager: BackgroundTaskManager,
    data_loader: DataLoader,
}

impl DataEventHandler for TaskRunner {
    fn execute_with_context(&mut self, command: AppCommand, state: &mut AppState) {
        // Keystrokes would flood the logs overlay with its own input
        if !state.logs_visible {
            tracing::info!("Executing command: {:?}", command);
        }
        executor::execute_command(command, state, &mut self.task_manager, &self.data_loader);
    }
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<()> {
        // Create log buffer before initializing logging
        let log_buffer = LogBuffer::new(LOG_BUFFER_SIZE);
        let log_path = init_logging_with_buffer(log_buffer.clone())?;

        tracing::info!("job portal starting, logging to {}", log_path.display());

        let ctx = AuthContext::bootstrap(self.config.auth.clone())
            .context("Failed to set up the session store")?;
        let clients = Arc::new(ServiceClients::new(&ctx).context("Failed to build API clients")?);
        let geo = Arc::new(GeoLocator::new(&self.config.ui)?);

        // Subscribe before hydrating so the first refresh outcome is not missed
        let mut auth_events = ctx.coordinator.subscribe();

        let (data_tx, mut data_rx) = tokio::sync::mpsc::unbounded_channel();
        let data_loader = DataLoader::new(ctx, clients, geo, data_tx);

        let mut ui_state = AppState::new();
        ui_state.otp_policy = OtpPolicy {
            validity: self.config.ui.otp_validity(),
            resend_fraction: self.config.ui.otp_resend_fraction,
        };

        let runner = TaskRunner {
            task_manager: BackgroundTaskManager::new(self.config.ui.search_debounce()),
            data_loader,
        };
        let mut core = AppCore::with_state(ui_state, runner);

        let mut terminal = self.init()?;
        let mut event_stream = EventStream::new();

        self.init_data(&mut core);

        tracing::info!("Entering main event loop");

        let mut interval = tokio::time::interval(std::time::Duration::from_millis(100));
        let result = loop {
            if let Err(e) = terminal.draw(|f| crate::ui::render_app(f, core.state(), &log_buffer)) {
                break Err(anyhow::Error::from(e));
            }

            tokio::select! {
                _ = interval.tick() => {
                    core.tick();
                }
                Some(Ok(event)) = event_stream.next() => {
                    match event {
                        Event::Key(key) if matches!(key.kind, KeyEventKind::Press) => {
                            if !core.state().logs_visible {
                                tracing::debug!("Key press: {:?}", key);
                            }
                            core.handle_key(KeyEvent::from(key));
                        }
                        Event::Paste(text) => core.handle_paste(&text),
                        _ => {
                            // Ignore other events
                        }
                    }
                }
                Some(data_event) = data_rx.recv() => {
                    tracing::debug!("Received data event: {:?}", data_event);
                    core.handle_data_event(data_event);
                }
                event = auth_events.recv() => {
                    match event {
                        Ok(AuthEvent::Refreshed(identity)) => {
                            core.handle_data_event(DataEvent::SessionRefreshed { identity });
                        }
                        Ok(AuthEvent::SessionExpired) => {
                            core.handle_data_event(DataEvent::SessionExpired);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Missed {} auth events", skipped);
                        }
                        Err(RecvError::Closed) => {}
                    }
                }
            }

            if core.should_quit() {
                tracing::info!("Quit requested, exiting event loop");
                break Ok(());
            }
        };

        tracing::info!("Cleaning up application");

        // Cancel all background data loading tasks
        core.handler_mut().task_manager.cancel_all();

        self.exit(terminal)?;

        result
    }

    fn init(&self) -> Result<Tui, std::io::Error> {
        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
    }

    fn init_data(&self, core: &mut AppCore<TaskRunner>) {
        tracing::info!("Restoring session and loading jobs");
        core.handler_mut().data_loader.restore_session();
        core.execute(AppCommand::Navigate(Route::Jobs));
    }

    fn exit(&self, mut terminal: Tui) -> Result<(), std::io::Error> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;
        Ok(())
    }
}
