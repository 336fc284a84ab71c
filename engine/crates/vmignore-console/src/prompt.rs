//! Operator input and output

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use console::Term;

/// Line-oriented conversation with the operator
pub trait Prompter {
    /// Show `label` and read one line, without the trailing newline
    fn ask(&mut self, label: &str) -> io::Result<String>;

    /// Like [`Prompter::ask`], without echoing the input
    fn ask_secret(&mut self, label: &str) -> io::Result<String>;

    /// Print one line of output
    fn say(&mut self, line: &str) -> io::Result<()>;
}

/// Prompter on the process's stdin/stdout
#[derive(Debug, Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for Terminal {
    fn ask(&mut self, label: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", label)?;
        stdout.flush()?;

        let mut input = String::new();
        let n = io::stdin().lock().read_line(&mut input)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, label: &str) -> io::Result<String> {
        let term = Term::stdout();
        if !term.is_term() {
            return self.ask(label);
        }
        term.write_str(label)?;
        term.read_secure_line()
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", line)
    }
}

/// Prompter that replays a fixed list of answers and records everything shown
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl Scripted {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Lines passed to [`Prompter::say`], in order
    pub fn output(&self) -> Vec<&str> {
        self.transcript
            .iter()
            .filter_map(|entry| entry.strip_prefix("> "))
            .collect()
    }

    /// Prompt labels shown, in order
    pub fn prompts(&self) -> Vec<&str> {
        self.transcript
            .iter()
            .filter_map(|entry| entry.strip_prefix("? "))
            .collect()
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for Scripted {
    fn ask(&mut self, label: &str) -> io::Result<String> {
        self.transcript.push(format!("? {}", label));
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn ask_secret(&mut self, label: &str) -> io::Result<String> {
        self.ask(label)
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        self.transcript.push(format!("> {}", line));
        Ok(())
    }
}
