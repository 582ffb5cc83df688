use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use colored::{ColoredString, Colorize};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use super::deck::Deck;
use super::snapshot::{self, SnapshotError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    #[error("expected a question count, got {0:?}")]
    InvalidCount(String),
    #[error("unexpected end of input")]
    EndOfInput,
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
    Import,
    Export,
    Ask,
    Exit,
    Log,
    HardestCard,
    ResetStats,
}

impl Action {
    /// Case-insensitive; runs of internal whitespace count as one separator.
    pub fn parse(input: &str) -> Result<Action, SessionError> {
        let normalized = input
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "add" => Ok(Action::Add),
            "remove" => Ok(Action::Remove),
            "import" => Ok(Action::Import),
            "export" => Ok(Action::Export),
            "ask" => Ok(Action::Ask),
            "exit" => Ok(Action::Exit),
            "log" => Ok(Action::Log),
            "hardest card" => Ok(Action::HardestCard),
            "reset stats" => Ok(Action::ResetStats),
            _ => Err(SessionError::UnknownAction(input.to_owned())),
        }
    }
}

/// Console I/O with a verbatim transcript of every line shown or read.
/// The reader and writer are injected so tests can script a whole session.
pub struct Console<R, W> {
    input: R,
    output: W,
    transcript: String,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Console<R, W> {
        Console {
            input,
            output,
            transcript: String::new(),
        }
    }

    pub fn say(&mut self, line: &str) -> Result<(), SessionError> {
        self.transcript.push_str(line);
        self.transcript.push('\n');
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Paints the live line only; the transcript stays plain.
    pub fn say_with(
        &mut self,
        line: &str,
        paint: fn(&str) -> ColoredString,
    ) -> Result<(), SessionError> {
        self.transcript.push_str(line);
        self.transcript.push('\n');
        writeln!(self.output, "{}", paint(line))?;
        Ok(())
    }

    pub fn read_line(&mut self) -> Result<String, SessionError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SessionError::EndOfInput);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        self.transcript.push_str(&line);
        self.transcript.push('\n');
        Ok(line)
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

pub struct Session<R, W> {
    deck: Deck,
    console: Console<R, W>,
    export_on_exit: Option<PathBuf>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(console: Console<R, W>, export_on_exit: Option<PathBuf>) -> Session<R, W> {
        Session {
            deck: Deck::new(),
            console,
            export_on_exit,
        }
    }

    /// Import semantics for a path given on the command line, without the
    /// file name prompt.
    pub fn import_startup(&mut self, path: &Path) -> Result<(), SessionError> {
        self.load_snapshot(path)
    }

    pub fn run(&mut self, rng: &mut impl Rng) -> Result<(), SessionError> {
        loop {
            self.console.say_with(
                "Input the action (add, remove, import, export, ask, exit):",
                |s| s.cyan(),
            )?;
            let action = Action::parse(&self.console.read_line()?)?;
            debug!("[Session] Action: {:?}", action);
            match action {
                Action::Add => self.add()?,
                Action::Remove => self.remove()?,
                Action::Import => self.import()?,
                Action::Export => self.export()?,
                Action::Ask => self.ask(rng)?,
                Action::Log => self.log()?,
                Action::HardestCard => self.hardest_card()?,
                Action::ResetStats => self.reset_stats()?,
                Action::Exit => break,
            }
            self.console.say("")?;
        }
        self.console.say_with("Bye bye!", |s| s.cyan())?;
        if let Some(path) = self.export_on_exit.take() {
            self.save_snapshot(&path)?;
        }
        Ok(())
    }

    fn add(&mut self) -> Result<(), SessionError> {
        self.console.say("The card:")?;
        let term = self.console.read_line()?;
        if self.deck.get(&term).is_some() {
            return self
                .console
                .say_with(&format!("The card \"{term}\" already exists."), |s| s.yellow());
        }
        self.console.say("The definition of the card:")?;
        let definition = self.console.read_line()?;
        match self.deck.add(&term, &definition) {
            Ok(()) => self
                .console
                .say(&format!("The pair (\"{term}\":\"{definition}\") has been added.")),
            Err(err) => self.console.say_with(&err.to_string(), |s| s.yellow()),
        }
    }

    fn remove(&mut self) -> Result<(), SessionError> {
        self.console.say("Which card?")?;
        let term = self.console.read_line()?;
        match self.deck.remove(&term) {
            Ok(_) => self.console.say("The card has been removed."),
            Err(err) => self.console.say_with(&err.to_string(), |s| s.yellow()),
        }
    }

    fn import(&mut self) -> Result<(), SessionError> {
        self.console.say("File name:")?;
        let file_name = self.console.read_line()?;
        self.load_snapshot(Path::new(&file_name))
    }

    fn load_snapshot(&mut self, path: &Path) -> Result<(), SessionError> {
        if !path.exists() {
            warn!("[Session] Import file {:?} does not exist", path);
            return self.console.say_with("File not found.", |s| s.yellow());
        }
        let count = snapshot::load(&mut self.deck, path)?;
        self.console.say(&format!("{count} cards have been loaded."))
    }

    fn export(&mut self) -> Result<(), SessionError> {
        self.console.say("File name:")?;
        let file_name = self.console.read_line()?;
        self.save_snapshot(Path::new(&file_name))
    }

    fn save_snapshot(&mut self, path: &Path) -> Result<(), SessionError> {
        let count = snapshot::save(&self.deck, path)?;
        self.console.say(&format!("{count} cards have been saved."))
    }

    fn ask(&mut self, rng: &mut impl Rng) -> Result<(), SessionError> {
        self.console.say("How many times to ask?")?;
        let reply = self.console.read_line()?;
        let count: usize = reply
            .trim()
            .parse()
            .map_err(|_| SessionError::InvalidCount(reply.clone()))?;
        if self.deck.is_empty() {
            warn!("[Session] Nothing to ask, the deck is empty");
            return self
                .console
                .say_with("There are no cards to ask about.", |s| s.yellow());
        }
        debug!("[Session] Asking {} of {} cards", count, self.deck.len());
        let mut order = self.deck.terms();
        order.shuffle(rng);
        debug!("[Session] Quiz order: {:?}", order);
        self.quiz(&order, count)
    }

    /// One pass over a fixed card order. When `count` exceeds the deck size
    /// the same order repeats cyclically; it is never re-shuffled.
    fn quiz(&mut self, order: &[String], count: usize) -> Result<(), SessionError> {
        for i in 0..count {
            let term = &order[i % order.len()];
            let Some(card) = self.deck.get(term) else {
                continue;
            };
            let definition = card.definition.clone();
            self.console
                .say_with(&format!("Print the definition of \"{term}\":"), |s| s.cyan())?;
            let answer = self.console.read_line()?;
            if answer == definition {
                self.console.say_with("Correct!", |s| s.bright_green())?;
            } else {
                self.deck.record_error(term);
                let verdict = match self.deck.find_by_definition(&answer) {
                    Some(other) => format!(
                        "Wrong. The right answer is \"{definition}\", \
                         but your definition is correct for \"{other}\"."
                    ),
                    None => format!("Wrong. The right answer is \"{definition}\"."),
                };
                self.console.say_with(&verdict, |s| s.bright_red())?;
            }
        }
        Ok(())
    }

    fn log(&mut self) -> Result<(), SessionError> {
        self.console.say("File name:")?;
        let file_name = self.console.read_line()?;
        fs::write(&file_name, self.console.transcript())?;
        self.console.say("The log has been saved.")
    }

    fn hardest_card(&mut self) -> Result<(), SessionError> {
        match self.deck.hardest() {
            None => self.console.say("There are no cards with errors."),
            Some((tied, errors)) if tied.len() == 1 => self.console.say(&format!(
                "The hardest card is \"{}\". You have {} errors answering it.",
                tied[0].term, errors
            )),
            Some((tied, errors)) => {
                let terms = tied
                    .iter()
                    .map(|card| format!("\"{}\"", card.term))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.console.say(&format!(
                    "The hardest cards are {terms}. You have {errors} errors answering them."
                ))
            }
        }
    }

    fn reset_stats(&mut self) -> Result<(), SessionError> {
        self.deck.reset_errors();
        self.console.say("Card statistics have been reset")
    }
}
