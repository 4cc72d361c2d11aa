//! User interaction seam.
//!
//! The operation and workflow code asks questions through [`Interaction`]
//! and never touches the console itself. [`ConsoleInteraction`] is used by
//! the binary; the scripted double lives in [`crate::testing`].

use std::io::{self, BufRead, Write};

/// Presents messages and collects user decisions.
pub trait Interaction {
    /// Show an informational message.
    fn notify(&self, message: &str);

    /// Ask a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&self, question: &str) -> bool;

    /// Ask for a line of free text. `None` when no input is available.
    fn input(&self, prompt: &str) -> Option<String>;

    /// Ask the user to pick one of `options`; returns a 0-based index.
    fn select(&self, prompt: &str, options: &[String]) -> Option<usize>;
}

/// Whether a free-text answer is an explicit yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Parse a 1-based selection into a 0-based index within `len`.
pub fn parse_selection(answer: &str, len: usize) -> Option<usize> {
    match answer.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n - 1),
        _ => None,
    }
}

/// Interaction over stdin/stdout.
#[derive(Debug, Default)]
pub struct ConsoleInteraction;

impl ConsoleInteraction {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn prompt(&self, text: &str) {
        print!("{} ", text);
        let _ = io::stdout().flush();
    }
}

impl Interaction for ConsoleInteraction {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }

    fn confirm(&self, question: &str) -> bool {
        self.prompt(&format!("{} (yes/no)", question));
        self.read_line().is_some_and(|answer| is_affirmative(&answer))
    }

    fn input(&self, prompt: &str) -> Option<String> {
        self.prompt(prompt);
        self.read_line()
    }

    fn select(&self, prompt: &str, options: &[String]) -> Option<usize> {
        for (i, option) in options.iter().enumerate() {
            println!("{}. {}", i + 1, option);
        }
        self.prompt(prompt);
        self.read_line()
            .and_then(|answer| parse_selection(&answer, options.len()))
    }
}
