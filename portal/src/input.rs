use crossterm::event::{KeyCode, KeyEvent as CrosstermKeyEvent, KeyModifiers};

/// Terminal-independent key, so tests can drive the app without crossterm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

/// Key event with modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: true,
                ..Default::default()
            },
        }
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            // Unmapped keys become a char no handler matches
            _ => Key::Char('\0'),
        }
    }
}

impl From<CrosstermKeyEvent> for KeyEvent {
    fn from(event: CrosstermKeyEvent) -> Self {
        Self {
            key: Key::from(event.code),
            modifiers: Modifiers {
                ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
                alt: event.modifiers.contains(KeyModifiers::ALT),
                shift: event.modifiers.contains(KeyModifiers::SHIFT),
            },
        }
    }
}

/// One line typed at the `:` prompt, split into a command word and its
/// arguments.
///
/// Words are separated by whitespace; double quotes group words into one
/// argument (`location "New York"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    pub raw: String,
    pub command: String,
    pub args: Vec<String>,
}

impl InputLine {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = tokenize(line)?.into_iter();
        let Some(command) = words.next() else {
            return Ok(None);
        };

        Ok(Some(Self {
            raw: line.trim().to_string(),
            command: command.to_ascii_lowercase(),
            args: words.collect(),
        }))
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Arguments from `index` on, joined with single spaces.
    pub fn rest(&self, index: usize) -> String {
        self.args.get(index..).unwrap_or_default().join(" ")
    }
}

fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err("Unclosed quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossterm_events_keep_modifiers() {
        let event = KeyEvent::from(CrosstermKeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        ));
        assert_eq!(event, KeyEvent::with_ctrl(Key::Char('c')));
        assert_eq!(Key::from(KeyCode::F(5)), Key::Char('\0'));
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(InputLine::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_command_is_lowercased_args_are_not() {
        let line = InputLine::parse("  LOGIN Ana@Example.com  Secret1 ").unwrap().unwrap();
        assert_eq!(line.command, "login");
        assert_eq!(line.args, vec!["Ana@Example.com", "Secret1"]);
        assert_eq!(line.raw, "LOGIN Ana@Example.com  Secret1");
    }

    #[test]
    fn test_quotes_group_words() {
        let line = InputLine::parse(r#"location "New York" now"#).unwrap().unwrap();
        assert_eq!(line.args, vec!["New York", "now"]);

        let empty = InputLine::parse(r#"search """#).unwrap().unwrap();
        assert_eq!(empty.args, vec![""]);
    }

    #[test]
    fn test_unclosed_quote_is_an_error() {
        assert!(InputLine::parse(r#"search "rust"#).is_err());
    }

    #[test]
    fn test_rest_joins_remaining_args() {
        let line = InputLine::parse("register candidate a@b.co pw Ana  Maria Silva")
            .unwrap()
            .unwrap();
        assert_eq!(line.rest(3), "Ana Maria Silva");
        assert_eq!(line.rest(9), "");
        assert_eq!(line.arg(0), Some("candidate"));
        assert_eq!(line.arg(7), None);
    }
}
