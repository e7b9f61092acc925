use std::fmt;

use services::SessionCommand;

/// One line typed during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Session(SessionCommand),
    Restart,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str },
    InvalidOption(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => write!(f, "type a command, or ? for help"),
            InputError::Unknown(word) => write!(f, "unknown command: {word} (? for help)"),
            InputError::MissingArgument { command } => write!(f, "{command} needs an argument"),
            InputError::InvalidOption(raw) => write!(f, "not an option number: {raw}"),
        }
    }
}

impl std::error::Error for InputError {}

/// Options are typed 1-based, as displayed.
pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "" => return Err(InputError::Empty),
        "n" | "next" => SessionCommand::Next,
        "p" | "prev" | "previous" => SessionCommand::Previous,
        "a" | "answer" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument { command: "a" });
            }
            match rest.parse::<usize>() {
                Ok(n) if n > 0 => SessionCommand::Select(n - 1),
                _ => return Err(InputError::InvalidOption(rest.to_string())),
            }
        }
        "w" | "write" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument { command: "w" });
            }
            SessionCommand::Write(rest.to_string())
        }
        "f" | "flip" => SessionCommand::Flip,
        "y" | "yes" => SessionCommand::Grade(true),
        "x" | "no" => SessionCommand::Grade(false),
        "submit" => SessionCommand::Submit,
        "restart" => return Ok(Input::Restart),
        "?" | "h" | "help" => return Ok(Input::Help),
        "q" | "quit" | "exit" => return Ok(Input::Quit),
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Input::Session(command))
}

pub fn help_text() -> &'static str {
    "commands:\n\
     \x20 n / p          next / previous item\n\
     \x20 a <number>     choose an option (multiple choice)\n\
     \x20 w <text>       replace your answer (written)\n\
     \x20 f              flip the card\n\
     \x20 y / x          I knew it / I did not (flashcards)\n\
     \x20 submit         hand in the test\n\
     \x20 restart        go again once finished\n\
     \x20 quit           leave"
}
