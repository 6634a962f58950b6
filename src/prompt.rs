//! Operator confirmation before each send

use async_trait::async_trait;
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Operator's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
}

/// Errors while asking for confirmation
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("confirmation input closed before an answer was given")]
    Closed,

    #[error("failed to read confirmation: {0}")]
    Io(#[from] std::io::Error),
}

/// Asks a human whether to go ahead
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn ask(&self, title: &str, message: &str) -> Result<Decision, PromptError>;
}

/// Yes/no prompt reading answers line by line
///
/// The question goes to stderr. Anything other than yes/no is asked again;
/// end of input is an error rather than an implicit answer.
pub struct LinePrompt<R> {
    input: Mutex<R>,
}

/// Prompt on the controlling terminal
pub type TerminalPrompt = LinePrompt<BufReader<Stdin>>;

impl TerminalPrompt {
    pub fn stdin() -> Self {
        LinePrompt::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LinePrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

/// Interpret one line of operator input
pub fn parse_answer(line: &str) -> Option<Decision> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Decision::Yes),
        "n" | "no" => Some(Decision::No),
        _ => None,
    }
}

#[async_trait]
impl<R> ConfirmationPrompt for LinePrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn ask(&self, title: &str, message: &str) -> Result<Decision, PromptError> {
        let mut input = self.input.lock().await;

        {
            let mut stderr = std::io::stderr().lock();
            writeln!(stderr, "\n{}\n{}", title, message)?;
        }

        loop {
            {
                let mut stderr = std::io::stderr().lock();
                write!(stderr, "[y/n] ")?;
                stderr.flush()?;
            }

            let mut line = String::new();
            let read = input.read_line(&mut line).await?;
            if read == 0 {
                return Err(PromptError::Closed);
            }

            match parse_answer(&line) {
                Some(decision) => return Ok(decision),
                None => tracing::debug!(answer = line.trim(), "Unrecognized answer"),
            }
        }
    }
}

/// Prompt that answers without asking, for `--yes` and dry runs
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub Decision);

impl AutoConfirm {
    pub fn yes() -> Self {
        Self(Decision::Yes)
    }
}

#[async_trait]
impl ConfirmationPrompt for AutoConfirm {
    async fn ask(&self, title: &str, _message: &str) -> Result<Decision, PromptError> {
        tracing::debug!(title, decision = ?self.0, "Auto-answering confirmation");
        Ok(self.0)
    }
}
