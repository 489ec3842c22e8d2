use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Answers accepted as "go ahead", in English and French, full or short
pub const AFFIRMATIVE_ANSWERS: &[&str] = &["yes", "y", "oui", "o"];

/// What the user is asked to approve
#[derive(Debug, Clone, Copy)]
pub struct ConfirmRequest<'a> {
    /// Rendered preview of the planned work, printed before the question
    pub preview: &'a str,
    pub question: &'a str,
    /// Number of planned items
    pub count: usize,
}

/// Decides whether a planned batch may run. Returning `false` cancels the
/// run before anything is touched.
pub trait Confirmation {
    fn confirm(&mut self, request: &ConfirmRequest<'_>) -> Result<bool>;
}

/// Approves everything without printing (`--yes`)
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirmation for AssumeYes {
    fn confirm(&mut self, _request: &ConfirmRequest<'_>) -> Result<bool> {
        Ok(true)
    }
}

/// Prints the preview and question to `writer` and reads one answer line
/// from `reader`
pub struct PromptConfirmation<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> PromptConfirmation<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl PromptConfirmation<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirmation for PromptConfirmation<R, W> {
    fn confirm(&mut self, request: &ConfirmRequest<'_>) -> Result<bool> {
        if !request.preview.is_empty() {
            writeln!(self.writer, "{}", request.preview)?;
        }
        write!(self.writer, "{} (yes/no): ", request.question)?;
        self.writer.flush().context("Failed to flush prompt")?;

        let _guard = ConfirmationPromptGuard::activate();
        let mut input = String::new();
        self.reader
            .read_line(&mut input)
            .context("Failed to read user input")?;

        Ok(is_affirmative(&input))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE_ANSWERS.contains(&answer.as_str())
}

/// Tracks whether we are currently waiting on a confirmation answer.
static CONFIRMATION_PROMPT_ACTIVE: AtomicBool = AtomicBool::new(false);

/// RAII helper that marks the confirmation prompt as active while it is in scope.
pub struct ConfirmationPromptGuard;

impl ConfirmationPromptGuard {
    pub fn activate() -> Self {
        CONFIRMATION_PROMPT_ACTIVE.store(true, Ordering::SeqCst);
        Self
    }
}

impl Drop for ConfirmationPromptGuard {
    fn drop(&mut self) {
        CONFIRMATION_PROMPT_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// Returns true while a prompt is blocked on input. Nothing has been
/// modified at that point, so an interrupt can exit right away.
pub fn confirmation_prompt_active() -> bool {
    CONFIRMATION_PROMPT_ACTIVE.load(Ordering::SeqCst)
}
