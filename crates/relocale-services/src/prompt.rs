use crate::Result;

/// A line of progress shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'a> {
    /// Headings and previews.
    Info(&'a str),
    /// A step that succeeded.
    Done(&'a str),
    Warn(&'a str),
    /// A caught failure; the run goes on.
    Failed(&'a str),
}

/// The operator seam of a run: questions and progress lines.
pub trait Prompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    fn input(&mut self, message: &str) -> Result<String>;

    fn notify(&mut self, _notice: Notice<'_>) {}
}
