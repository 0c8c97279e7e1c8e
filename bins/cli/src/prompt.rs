//! Operator prompts.
//!
//! Prompting never happens inside a unit of work: the transfer flows call in
//! here only before opening one, or between the optimistic read and write
//! phases when no lock is held.

use std::str::FromStr;

use ledgerlock_shared::AppError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Where operator answers come from.
pub trait LineSource {
    /// Shows `prompt` and reads one line. An interrupt or end of input is
    /// `Aborted`.
    fn read_line(&mut self, prompt: &str) -> Result<String, AppError>;
}

/// Line editor on the controlling terminal.
///
/// The editor is created on first use, so a fully flag-driven run never
/// touches the terminal.
#[derive(Default)]
pub struct Terminal {
    editor: Option<DefaultEditor>,
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<String, AppError> {
        if self.editor.is_none() {
            let editor = DefaultEditor::new()
                .map_err(|e| AppError::Internal(format!("Terminal unavailable: {e}")))?;
            self.editor = Some(editor);
        }
        let Some(editor) = self.editor.as_mut() else {
            return Err(AppError::Internal("Terminal unavailable".into()));
        };

        match editor.readline(prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                Err(AppError::Aborted("input closed".into()))
            }
            Err(e) => Err(AppError::Internal(format!("Failed to read input: {e}"))),
        }
    }
}

/// Line-oriented prompts.
pub struct Prompter<L = Terminal> {
    lines: L,
    assume_yes: bool,
}

impl Prompter<Terminal> {
    /// Creates a terminal prompter. With `assume_yes` every confirmation is
    /// accepted without asking.
    pub fn new(assume_yes: bool) -> Self {
        Self::with_lines(Terminal::default(), assume_yes)
    }
}

impl<L> Prompter<L> {
    /// Creates a prompter reading answers from `lines`.
    pub const fn with_lines(lines: L, assume_yes: bool) -> Self {
        Self { lines, assume_yes }
    }

    #[cfg(test)]
    pub const fn lines(&self) -> &L {
        &self.lines
    }
}

impl<L: LineSource> Prompter<L> {
    /// Returns `value` if supplied, otherwise asks for it.
    pub fn value_or_ask<T>(&mut self, value: Option<T>, label: &str) -> Result<T, AppError>
    where
        T: FromStr,
        AppError: From<T::Err>,
    {
        match value {
            Some(value) => Ok(value),
            None => {
                let line = self.lines.read_line(&format!("{label}: "))?;
                Ok(line.trim().parse::<T>()?)
            }
        }
    }

    /// Asks a yes/no question. Anything but `y` or `yes` declines.
    pub fn confirm(&mut self, question: &str) -> Result<bool, AppError> {
        if self.assume_yes {
            println!("{question} (y/n) y");
            return Ok(true);
        }
        let answer = self.lines.read_line(&format!("{question} (y/n) "))?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Answers fed from a fixed script, recording every prompt shown.
#[cfg(test)]
pub struct ScriptedLines {
    answers: std::collections::VecDeque<String>,
    prompts: Vec<String>,
    hook: Option<(usize, Box<dyn FnOnce()>)>,
}

#[cfg(test)]
impl ScriptedLines {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            hook: None,
        }
    }

    /// Runs `hook` when prompt number `index` (zero-based) is shown, before
    /// it is answered.
    pub fn before_answer(mut self, index: usize, hook: impl FnOnce() + 'static) -> Self {
        self.hook = Some((index, Box::new(hook)));
        self
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

#[cfg(test)]
impl LineSource for ScriptedLines {
    fn read_line(&mut self, prompt: &str) -> Result<String, AppError> {
        let index = self.prompts.len();
        self.prompts.push(prompt.to_owned());
        match self.hook.take() {
            Some((at, hook)) if at == index => hook(),
            pending => self.hook = pending,
        }
        self.answers
            .pop_front()
            .ok_or_else(|| AppError::Aborted("input closed".into()))
    }
}
