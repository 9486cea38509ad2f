//! Line-oriented evaluation console speaking a subset of UCI.
//!
//! Supported: `uci`, `isready`, `ucinewgame`, `setoption name EvalFile value <path>`,
//! `position startpos | fen <fen>`, `eval`, `d`, `quit`. There is no move
//! generator behind the console, so `position ... moves` is rejected.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::FenError;
use crate::nnue::{evaluate_position, SharedWeights};
use crate::position::Board;

pub mod command;
pub mod options;

use command::{parse_uci_command, UciCommand};
use options::{parse_setoption, UciOptionAction, UciOptions};

/// Error type for UCI position command parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    /// Invalid FEN string
    InvalidFen(FenError),
    /// Move lists need a rules engine
    MovesUnsupported,
    /// Missing required parts in the command
    MissingParts,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "Invalid FEN: {e}"),
            UciError::MovesUnsupported => write!(f, "Move lists are not supported"),
            UciError::MissingParts => write!(f, "Missing required parts in position command"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}

/// Parse a UCI position command.
///
/// Accepts "position startpos" and "position fen <fen>". The FEN may omit
/// the trailing fields.
pub fn try_parse_position_command<S: AsRef<str>>(parts: &[S]) -> Result<Board, UciError> {
    let parts: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();
    let moves_at = parts.iter().position(|&p| p == "moves");
    if moves_at.is_some_and(|i| i + 1 < parts.len()) {
        return Err(UciError::MovesUnsupported);
    }
    let parts = &parts[..moves_at.unwrap_or(parts.len())];

    match parts.get(1) {
        Some(&"startpos") => Ok(Board::new()),
        Some(&"fen") if parts.len() > 2 => Ok(Board::try_from_fen(&parts[2..].join(" "))?),
        _ => Err(UciError::MissingParts),
    }
}

/// Console state: current position, weights and options.
pub struct Console {
    board: Board,
    weights: SharedWeights,
    options: UciOptions,
}

impl Console {
    /// Console with an unloaded store.
    #[must_use]
    pub fn new(options: UciOptions) -> Self {
        Console {
            board: Board::new(),
            weights: SharedWeights::default(),
            options,
        }
    }

    /// Console that loads `options.eval_file` up front. A load failure is
    /// logged; `eval` stays unavailable until a later `setoption` succeeds.
    #[must_use]
    pub fn with_weights(options: UciOptions) -> Self {
        let console = Console::new(options);
        if let Err(e) = console.weights.reload(&console.options.eval_file) {
            log::warn!("{e}");
        }
        console
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn weights(&self) -> &SharedWeights {
        &self.weights
    }

    fn load_weights<W: Write>(&self, path: &Path, out: &mut W) -> io::Result<()> {
        match self.weights.reload(path) {
            Ok(report) if report.is_clean() => {
                writeln!(out, "info string loaded {}", path.display())
            }
            Ok(report) => writeln!(
                out,
                "info string loaded {} with {} warnings",
                path.display(),
                report.warnings().len()
            ),
            Err(e) => writeln!(out, "info string {e}"),
        }
    }

    /// Execute one command. Returns `Ok(false)` on `quit`.
    pub fn handle<W: Write>(&mut self, cmd: UciCommand, out: &mut W) -> io::Result<bool> {
        match cmd {
            UciCommand::Uci => self.options.print(out)?,
            UciCommand::IsReady => writeln!(out, "readyok")?,
            UciCommand::UciNewGame => self.board = Board::new(),
            UciCommand::Position(parts) => match try_parse_position_command(&parts) {
                Ok(board) => self.board = board,
                Err(e) => writeln!(out, "info string {e}")?,
            },
            UciCommand::SetOption(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                if let Some((name, value)) = parse_setoption(&parts) {
                    match self.options.apply_setoption(&name, value.as_deref()) {
                        Some(UciOptionAction::ReloadWeights(path)) => {
                            self.load_weights(&path, out)?;
                        }
                        None => log::debug!("ignoring option '{name}'"),
                    }
                }
            }
            UciCommand::Eval => {
                if self.weights.is_loaded() {
                    let score = evaluate_position(&self.board, &self.weights.snapshot());
                    writeln!(
                        out,
                        "info string eval {score:.4} cp {}",
                        score.round() as i32
                    )?;
                } else {
                    writeln!(out, "info string no weights loaded")?;
                }
            }
            UciCommand::Display => {
                writeln!(out, "{}", self.board)?;
                writeln!(out, "Fen: {}", self.board.to_fen())?;
            }
            UciCommand::Quit => return Ok(false),
            UciCommand::Unknown(line) => writeln!(out, "info string unknown command '{line}'")?,
        }
        Ok(true)
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        for line in input.lines() {
            let Some(cmd) = parse_uci_command(&line?) else {
                continue;
            };
            let keep_going = self.handle(cmd, out)?;
            out.flush()?;
            if !keep_going {
                break;
            }
        }
        Ok(())
    }
}

/// Run the console on stdin/stdout.
pub fn run_uci_loop(options: UciOptions) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    Console::with_weights(options).run(stdin.lock(), &mut stdout)
}
