use std::io::IsTerminal;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use relocale_config::ProjectLayout;
use relocale_services::{Outcome, Prompter, RunOptions};

use crate::prompt::{LinePrompter, TerminalPrompter};
use crate::{ui, ui_out, ui_warn, Ctx, Format};

pub struct ConfigureArgs {
    pub root: PathBuf,
    pub default_locale: Option<String>,
    pub locales: Option<Vec<String>>,
    pub yes: bool,
    pub dry_run: bool,
    pub format: Format,
}

pub fn run_configure(ctx: &Ctx, args: ConfigureArgs) -> color_eyre::Result<()> {
    tracing::debug!(
        event = "configure_args",
        root = ?args.root,
        default_locale = ?args.default_locale,
        locales = ?args.locales,
        yes = args.yes,
        dry_run = args.dry_run,
        format = ?args.format
    );

    // Keep stdout clean for the report.
    if args.format == Format::Json {
        ui::set_quiet(true);
    }

    let layout = ProjectLayout::from_config(&args.root, &ctx.cfg);
    let opts = RunOptions {
        default_locale: args.default_locale,
        locales: args.locales,
        assume_yes: args.yes,
        dry_run: args.dry_run,
    };

    let stdin = std::io::stdin();
    let mut terminal;
    let mut lines;
    let io: &mut dyn Prompter = if stdin.is_terminal() {
        terminal = TerminalPrompter;
        &mut terminal
    } else {
        lines = LinePrompter::new(stdin.lock());
        &mut lines
    };

    let summary = match relocale_services::configure(&layout, &opts, io)? {
        Outcome::Cancelled => {
            tracing::info!(event = "configure_cancelled");
            return Ok(());
        }
        Outcome::Completed(summary) => summary,
    };

    if args.format == Format::Json {
        ui_out!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.failures > 0 {
        let msg = format!(
            "{} step(s) failed; see the messages above",
            summary.failures
        );
        if ctx.use_color {
            ui_warn!("{}", msg.yellow());
        } else {
            ui_warn!("{msg}");
        }
    }
    Ok(())
}
