use std::io::{BufRead, Write};

use color_eyre::eyre::{eyre, Result, WrapErr};
use relocale_services::{Notice, Prompter};

use crate::{ui_err, ui_info, ui_ok, ui_warn};

fn show(notice: Notice<'_>) {
    match notice {
        Notice::Info(s) => ui_info!("{s}"),
        Notice::Done(s) => ui_ok!("{s}"),
        Notice::Warn(s) => ui_warn!("{s}"),
        Notice::Failed(s) => ui_err!("{s}"),
    }
}

/// Interactive prompts on a terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        inquire::Confirm::new(message)
            .with_default(default)
            .prompt()
            .wrap_err("prompt aborted")
    }

    fn input(&mut self, message: &str) -> Result<String> {
        inquire::Text::new(message)
            .prompt()
            .wrap_err("prompt aborted")
    }

    fn notify(&mut self, notice: Notice<'_>) {
        show(notice);
    }
}

/// Line-based answers, for piped stdin. Only `y`/`yes` confirms; an empty
/// line takes the default.
pub struct LinePrompter<R> {
    input: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_line(&mut self, message: &str, hint: &str) -> Result<String> {
        eprint!("{message}{hint} ");
        std::io::stderr().flush().ok();
        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .wrap_err("failed to read answer")?;
        if n == 0 {
            return Err(eyre!("input closed before answering: {message}"));
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { " (Y/n)" } else { " (y/N)" };
        let answer = self.read_line(message, hint)?.trim().to_lowercase();
        Ok(match answer.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    fn input(&mut self, message: &str) -> Result<String> {
        self.read_line(message, ":")
    }

    fn notify(&mut self, notice: Notice<'_>) {
        show(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_answers() {
        let mut p = LinePrompter::new("Y\n\nno\nfr, de\n".as_bytes());
        assert!(p.confirm("multi?", false).unwrap());
        assert!(p.confirm("ok?", true).unwrap());
        assert!(!p.confirm("ok?", true).unwrap());
        assert_eq!(p.input("locales").unwrap(), "fr, de");
        assert!(p.input("more").is_err());
    }

    #[test]
    fn empty_answer_takes_a_false_default() {
        let mut p = LinePrompter::new("\n".as_bytes());
        assert!(!p.confirm("Is this correct?", false).unwrap());
    }
}
