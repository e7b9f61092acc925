use std::fmt;
use std::path::PathBuf;

use services::Period;
use study_core::model::{DeckId, ExamId, ResultId};

const DEFAULT_AUTOSAVE_SECS: u64 = 5;

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    MissingCommand,
    UnknownCommand(String),
    UnknownArg(String),
    InvalidExamId { raw: String },
    InvalidDeckId { raw: String },
    InvalidResultId { raw: String },
    InvalidSeed { raw: String },
    InvalidAutosave { raw: String },
    InvalidPeriod { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::MissingCommand => write!(f, "a subcommand is required"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidExamId { raw } => write!(f, "invalid --exam-id value: {raw}"),
            ArgsError::InvalidDeckId { raw } => write!(f, "invalid --deck-id value: {raw}"),
            ArgsError::InvalidResultId { raw } => write!(f, "invalid --id value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidAutosave { raw } => {
                write!(f, "invalid --autosave-secs value (expected a positive integer): {raw}")
            }
            ArgsError::InvalidPeriod { raw } => {
                write!(f, "invalid --period value (all, week, month, 3months): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exams,
    Decks { search: Option<String> },
    Cards { deck_id: DeckId, search: Option<String> },
    Take { exam_id: ExamId },
    Study { deck_id: DeckId },
    Results { subject: Option<String>, period: Period },
    ResultDetail { id: ResultId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog: Option<PathBuf>,
    pub shuffle_seed: Option<u64>,
    pub autosave_secs: u64,
    pub command: Command,
}

fn parse_autosave(raw: String) -> Result<u64, ArgsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ArgsError::InvalidAutosave { raw }),
    }
}

fn parse_seed(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ArgsError::InvalidSeed { raw })
}

impl Config {
    /// Parse the process environment and arguments; `None` means help was requested.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown arguments or malformed values.
    pub fn from_env() -> Result<Option<Self>, ArgsError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Environment values are read first; flags override them. `None` means
    /// help was requested.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut catalog = env("STUDY_CATALOG")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut shuffle_seed = env("STUDY_SHUFFLE_SEED").map(parse_seed).transpose()?;
        let mut autosave_secs = env("STUDY_AUTOSAVE_SECS")
            .map(parse_autosave)
            .transpose()?
            .unwrap_or(DEFAULT_AUTOSAVE_SECS);

        let mut args = args.into_iter();
        let name = args.next().ok_or(ArgsError::MissingCommand)?;
        if matches!(name.as_str(), "--help" | "-h" | "help") {
            return Ok(None);
        }

        let mut search = None;
        let mut subject = None;
        let mut period = Period::All;
        let mut exam_id = None;
        let mut deck_id = None;
        let mut result_id = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => catalog = Some(PathBuf::from(require_value(&mut args, "--catalog")?)),
                "--seed" => shuffle_seed = Some(parse_seed(require_value(&mut args, "--seed")?)?),
                "--autosave-secs" => {
                    autosave_secs = parse_autosave(require_value(&mut args, "--autosave-secs")?)?;
                }
                "--search" => search = Some(require_value(&mut args, "--search")?),
                "--subject" => subject = Some(require_value(&mut args, "--subject")?),
                "--period" => {
                    let value = require_value(&mut args, "--period")?;
                    period = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPeriod { raw: value.clone() })?;
                }
                "--exam-id" => {
                    let value = require_value(&mut args, "--exam-id")?;
                    exam_id = Some(
                        value
                            .parse::<ExamId>()
                            .map_err(|_| ArgsError::InvalidExamId { raw: value.clone() })?,
                    );
                }
                "--deck-id" => {
                    let value = require_value(&mut args, "--deck-id")?;
                    deck_id = Some(
                        value
                            .parse::<DeckId>()
                            .map_err(|_| ArgsError::InvalidDeckId { raw: value.clone() })?,
                    );
                }
                "--id" => {
                    let value = require_value(&mut args, "--id")?;
                    result_id = Some(
                        value
                            .parse::<ResultId>()
                            .map_err(|_| ArgsError::InvalidResultId { raw: value.clone() })?,
                    );
                }
                "--help" | "-h" => {
                    return Ok(None);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match name.as_str() {
            "exams" => Command::Exams,
            "decks" => Command::Decks { search },
            "cards" => Command::Cards {
                deck_id: deck_id.ok_or(ArgsError::MissingFlag { flag: "--deck-id" })?,
                search,
            },
            "take" => Command::Take {
                exam_id: exam_id.ok_or(ArgsError::MissingFlag { flag: "--exam-id" })?,
            },
            "study" => Command::Study {
                deck_id: deck_id.ok_or(ArgsError::MissingFlag { flag: "--deck-id" })?,
            },
            "results" => match result_id {
                Some(id) => Command::ResultDetail { id },
                None => Command::Results { subject, period },
            },
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        Ok(Some(Self {
            catalog,
            shuffle_seed,
            autosave_secs,
            command,
        }))
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  study exams");
    eprintln!("  study decks   [--search <text>]");
    eprintln!("  study cards   --deck-id <id> [--search <text>]");
    eprintln!("  study take    --exam-id <id>");
    eprintln!("  study study   --deck-id <id>");
    eprintln!("  study results [--subject <name>] [--period all|week|month|3months]");
    eprintln!("  study results --id <id>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --catalog <path.json>     Catalog file (default: built-in sample)");
    eprintln!("  --seed <u64>              Shuffle questions and cards deterministically");
    eprintln!("  --autosave-secs <n>       Written test autosave interval (default: 5)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  STUDY_CATALOG, STUDY_SHUFFLE_SEED, STUDY_AUTOSAVE_SECS");
    eprintln!("  RUST_LOG controls log output");
}
