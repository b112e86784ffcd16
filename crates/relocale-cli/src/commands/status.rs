use std::path::PathBuf;

use owo_colors::OwoColorize;
use relocale_config::ProjectLayout;

use crate::{ui_out, Ctx, Format};

pub fn run_status(ctx: &Ctx, root: PathBuf, format: Format) -> color_eyre::Result<()> {
    tracing::debug!(event = "status_args", root = ?root, format = ?format);
    let layout = ProjectLayout::from_config(root, &ctx.cfg);
    let status = relocale_services::read_status(&layout)?;

    if format == Format::Json {
        ui_out!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let default = status.default_locale.to_string();
    let locales = status.locales.to_string();
    if ctx.use_color {
        ui_out!("{} {}", "Default locale:".bold(), default.green());
        ui_out!("{} {}", "Locales:".bold(), locales.cyan());
        ui_out!("{} {}", "Source:".bold(), status.source.blue());
    } else {
        ui_out!("Default locale: {default}");
        ui_out!("Locales: {locales}");
        ui_out!("Source: {}", status.source);
    }
    Ok(())
}
