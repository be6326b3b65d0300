use crate::commands::handlers;
use crate::events::{AppCommand, DataEvent};
use crate::input::{Key, KeyEvent};
use crate::state::{reducer, AppState, InputMode, ToastLevel};

/// Trait for handling command execution (production = real loader + tasks, test = mock)
///
/// This trait abstracts the side effects of command execution, allowing tests
/// to inject a mock implementation that doesn't spawn background tasks or make API calls.
pub trait DataEventHandler {
    /// Execute a command with access to mutable state
    fn execute_with_context(&mut self, command: AppCommand, state: &mut AppState);
}

/// Testable application core without terminal or network dependencies
///
/// Generic over H (handler). The handler type determines how commands are
/// executed: in production it spawns tasks, in tests it updates state
/// synchronously.
pub struct AppCore<H: DataEventHandler> {
    ui_state: AppState,
    handler: H,
}

impl<H: DataEventHandler> AppCore<H> {
    pub fn new(handler: H) -> Self {
        Self::with_state(AppState::new(), handler)
    }

    /// Start from a prepared state (configured OTP policy, restored session).
    pub fn with_state(ui_state: AppState, handler: H) -> Self {
        Self { ui_state, handler }
    }

    /// Handle one key press
    ///
    /// Toasts shown before the key are dismissed. Enter at the `:` prompt
    /// closes the prompt and runs the typed line.
    pub fn handle_key(&mut self, event: KeyEvent) {
        self.dismiss_toasts();

        if self.ui_state.input_mode == InputMode::Command && event.key == Key::Enter {
            let line = std::mem::take(&mut self.ui_state.command_line);
            self.execute(AppCommand::SetInputMode(InputMode::Normal));
            self.handle_line(&line);
            return;
        }

        if let Some(command) = handlers::handle_key_input(event, &self.ui_state) {
            self.execute(command);
        }
    }

    /// Handle text pasted into the terminal
    pub fn handle_paste(&mut self, text: &str) {
        if let Some(command) = handlers::handle_paste(text, &self.ui_state) {
            self.execute(command);
        }
    }

    /// Advance the loading spinner
    pub fn tick(&mut self) {
        if self.ui_state.is_loading() {
            self.ui_state.spinner.calc_next();
        }
    }

    /// Handle one line typed at the `:` prompt
    ///
    /// Parse errors become an error toast; nothing is executed.
    pub fn handle_line(&mut self, line: &str) {
        match handlers::handle_line(line, &self.ui_state) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => {}
            Err(message) => self.ui_state.push_toast(ToastLevel::Error, message),
        }
    }

    /// Execute a command directly, bypassing input parsing.
    pub fn execute(&mut self, command: AppCommand) {
        self.handler.execute_with_context(command, &mut self.ui_state);
    }

    /// Handle a data event (for test injection or async results)
    ///
    /// A follow-up command produced by the reducer (navigation after sign-in,
    /// a search after the location resolves) is executed right away.
    pub fn handle_data_event(&mut self, event: DataEvent) {
        if let Some(command) = reducer::reduce_data_event(&mut self.ui_state, event) {
            tracing::debug!("Follow-up command: {:?}", command);
            self.execute(command);
        }
    }

    pub fn state(&self) -> &AppState {
        &self.ui_state
    }

    /// Drop toasts the user has already seen.
    fn dismiss_toasts(&mut self) {
        self.ui_state.toasts.clear();
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn should_quit(&self) -> bool {
        self.ui_state.should_quit
    }
}
