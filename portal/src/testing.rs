use crate::app_core::{AppCore, DataEventHandler};
use crate::commands::executor;
use crate::events::{AppCommand, DataEvent};
use crate::input::{Key, KeyEvent};
use crate::state::{AppState, Route, ToastLevel};

/// Mock data event handler for tests (no real async tasks)
///
/// This handler executes commands synchronously using execute_command_sync,
/// which updates state without spawning background tasks or making API calls.
/// Every command it sees is recorded.
#[derive(Default)]
pub struct MockDataHandler {
    pub executed: Vec<AppCommand>,
}

impl MockDataHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataEventHandler for MockDataHandler {
    fn execute_with_context(&mut self, command: AppCommand, state: &mut AppState) {
        self.executed.push(command.clone());
        executor::execute_command_sync(command, state);
    }
}

pub struct TestApp {
    core: AppCore<MockDataHandler>,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            core: AppCore::new(MockDataHandler::new()),
        }
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            core: AppCore::with_state(state, MockDataHandler::new()),
        }
    }

    /// Send a key press (no modifiers)
    pub fn send_key(&mut self, key: Key) {
        self.send_key_event(KeyEvent::new(key));
    }

    /// Send a key event with modifiers
    pub fn send_key_event(&mut self, event: KeyEvent) {
        self.core.handle_key(event);
    }

    /// Send multiple keys in sequence
    pub fn send_keys(&mut self, keys: &[Key]) {
        for key in keys {
            self.send_key(*key);
        }
    }

    /// Type each character of `text` as its own key press
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.send_key(Key::Char(c));
        }
    }

    /// Paste `text` as the terminal would with bracketed paste on
    pub fn send_paste(&mut self, text: &str) {
        self.core.handle_paste(text);
    }

    /// Open the `:` prompt, type `line` and press Enter
    pub fn run_command(&mut self, line: &str) {
        self.send_key(Key::Char(':'));
        self.type_text(line);
        self.send_key(Key::Enter);
    }

    /// Inject a data event (simulate an API response)
    pub fn send_data_event(&mut self, event: DataEvent) {
        self.core.handle_data_event(event);
    }

    pub fn state(&self) -> &AppState {
        self.core.state()
    }

    /// Commands that reached the handler, oldest first.
    pub fn executed(&mut self) -> &[AppCommand] {
        &self.core.handler_mut().executed
    }

    pub fn assert_route(&self, expected: Route) {
        assert_eq!(
            self.state().route,
            expected,
            "Expected a different route. Toasts: {:?}",
            self.state().toasts
        );
    }

    /// Assert the newest toast has `level` and contains `text`
    pub fn assert_last_toast(&self, level: ToastLevel, text: &str) {
        let toast = self
            .state()
            .toasts
            .back()
            .unwrap_or_else(|| panic!("Expected a toast containing '{}', got none", text));
        assert_eq!(toast.level, level, "Unexpected toast level: {:?}", toast);
        assert!(
            toast.message.contains(text),
            "Expected toast containing '{}', got '{}'",
            text,
            toast.message
        );
    }

    pub fn assert_should_quit(&self) {
        assert!(
            self.core.should_quit(),
            "App should be marked for quit but is not"
        );
    }

    pub fn assert_not_quit(&self) {
        assert!(
            !self.core.should_quit(),
            "App should NOT be marked for quit but is"
        );
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
