//! Where match results come from.

use std::collections::VecDeque;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use thiserror::Error;

use crate::models::{Outcome, PlayerRef};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input closed before a result was entered")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The match a result is being asked for.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub round_number: u32,
    /// 1-based position in the round
    pub match_number: usize,
    pub first: &'a PlayerRef,
    pub second: &'a PlayerRef,
    /// The match was already in progress when the run started
    pub resumed: bool,
}

/// Blocking source of match outcomes.
pub trait ResultSource {
    fn outcome(&mut self, ctx: &MatchContext<'_>) -> Result<Outcome, InputError>;
}

impl<S: ResultSource + ?Sized> ResultSource for &mut S {
    fn outcome(&mut self, ctx: &MatchContext<'_>) -> Result<Outcome, InputError> {
        (**self).outcome(ctx)
    }
}

/// Parse a menu choice: `1` first player wins, `2` second player wins, `3` draw.
pub fn parse_choice(choice: &str) -> Option<Outcome> {
    match choice.trim() {
        "1" => Some(Outcome::AWins),
        "2" => Some(Outcome::BWins),
        "3" => Some(Outcome::Draw),
        _ => None,
    }
}

/// Interactive prompt on a reader/writer pair, usually stdin/stdout.
pub struct ConsoleResults<R, W> {
    input: R,
    output: W,
}

impl ConsoleResults<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleResults<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask for the closing remarks of a tournament until a non-empty line
    /// is entered.
    pub fn remarks(&mut self) -> Result<String, InputError> {
        let mut line = String::new();
        loop {
            write!(self.output, "Enter your remarks on the tournament: ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(InputError::Closed);
            }
            if !line.trim().is_empty() {
                return Ok(line.trim().to_string());
            }
            writeln!(self.output, "Remarks must not be empty.")?;
        }
    }

    fn announce(&mut self, ctx: &MatchContext<'_>) -> io::Result<()> {
        let (first, second) = (ctx.first.full_name(), ctx.second.full_name());
        if ctx.resumed {
            writeln!(self.output, "Resuming match in progress between {} and {}.", first, second)?;
        }
        writeln!(self.output)?;
        writeln!(
            self.output,
            "=== ROUND {} : MATCH {} ===",
            ctx.round_number, ctx.match_number
        )?;
        writeln!(self.output, "{} vs {}", first, second)?;
        writeln!(self.output, "1) {} wins", first)?;
        writeln!(self.output, "2) {} wins", second)?;
        writeln!(self.output, "3) Draw")
    }
}

impl<R: BufRead, W: Write> ResultSource for ConsoleResults<R, W> {
    fn outcome(&mut self, ctx: &MatchContext<'_>) -> Result<Outcome, InputError> {
        self.announce(ctx)?;

        let mut line = String::new();
        loop {
            write!(self.output, "Your choice (1, 2, 3): ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(InputError::Closed);
            }
            match parse_choice(&line) {
                Some(outcome) => return Ok(outcome),
                None => writeln!(self.output, "Invalid choice, please enter 1, 2 or 3.")?,
            }
        }
    }
}

/// One question asked of a [`ScriptedResults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asked {
    pub round_number: u32,
    pub match_number: usize,
    pub resumed: bool,
}

/// Replays a fixed list of outcomes, then reports the input as closed.
#[derive(Debug, Default)]
pub struct ScriptedResults {
    queue: VecDeque<Outcome>,
    asked: Vec<Asked>,
}

impl ScriptedResults {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            queue: outcomes.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Every request received so far, answered or not.
    pub fn asked(&self) -> &[Asked] {
        &self.asked
    }
}

impl ResultSource for ScriptedResults {
    fn outcome(&mut self, ctx: &MatchContext<'_>) -> Result<Outcome, InputError> {
        self.asked.push(Asked {
            round_number: ctx.round_number,
            match_number: ctx.match_number,
            resumed: ctx.resumed,
        });
        self.queue.pop_front().ok_or(InputError::Closed)
    }
}
