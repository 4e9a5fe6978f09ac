use crate::model::SessionError;
use std::io::{self, BufRead, Write};

/// Line-oriented dialogue with the user.
pub trait Console {
    fn say(&mut self, line: &str);

    /// Shows `prompt` and returns the trimmed answer.
    /// End of input is reported as [`SessionError::Interrupted`].
    fn ask(&mut self, prompt: &str) -> Result<String, SessionError>;
}

pub struct StdConsole;

impl Console for StdConsole {
    fn say(&mut self, line: &str) {
        println!("{}", line);
    }

    fn ask(&mut self, prompt: &str) -> Result<String, SessionError> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer)? == 0 {
            return Err(SessionError::Interrupted);
        }
        Ok(answer.trim().to_string())
    }
}

/// Replays canned answers and records everything shown.
#[cfg(test)]
pub struct ScriptedConsole {
    answers: std::collections::VecDeque<String>,
    pub transcript: Vec<String>,
}

#[cfg(test)]
impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|l| l.contains(needle))
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }

    fn ask(&mut self, prompt: &str) -> Result<String, SessionError> {
        self.transcript.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer.trim().to_string()),
            None => Err(SessionError::Interrupted),
        }
    }
}
