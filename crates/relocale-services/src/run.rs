//! The `configure` run: read the current locales, collect the desired ones,
//! resolve the diff, confirm, then rewrite artifacts and mirror directories.

use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use relocale_config::ProjectLayout;
use relocale_core::{resolve, Diff, LocaleCode, LocaleError, LocaleSet};
use relocale_domain::{ArtifactReport, LocaleStatus, RunSummary, SCHEMA_VERSION};
use relocale_textedit::Document;

use crate::mirror::{self, Applied, DirOp};
use crate::prompt::{Notice, Prompter};
use crate::rewrite::{self, Rewritten};
use crate::Result;

pub const LOCALE_EXAMPLES_URL: &str = "https://github.com/cospired/i18n-iso-languages";

/// Answers given up front; whatever is missing is asked for.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skips the questions. Without `locales` the site becomes single-locale.
    pub default_locale: Option<String>,
    pub locales: Option<Vec<String>>,
    /// Skips the confirmation.
    pub assume_yes: bool,
    /// Resolve and plan only; nothing is written.
    pub dry_run: bool,
}

#[derive(Debug)]
pub enum Outcome {
    /// The operator rejected the resolved set; nothing was touched.
    Cancelled,
    Completed(RunSummary),
}

fn read_current(layout: &ProjectLayout) -> Result<(LocaleCode, LocaleSet)> {
    let path = &layout.site_config;
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    rewrite::read_locale_config(&Document::new(text), path)
}

/// Current default and locales from the canonical artifact.
pub fn read_status(layout: &ProjectLayout) -> Result<LocaleStatus> {
    let (default_locale, locales) = read_current(layout)?;
    Ok(LocaleStatus {
        schema_version: SCHEMA_VERSION,
        source: layout.display(&layout.site_config).into_owned(),
        default_locale,
        locales,
    })
}

/// Split a comma-separated answer, dropping empty entries.
pub fn parse_locale_list(raw: &str) -> std::result::Result<Vec<LocaleCode>, LocaleError> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(LocaleCode::sanitize)
        .collect()
}

fn ask_default(io: &mut dyn Prompter) -> Result<LocaleCode> {
    loop {
        let raw = io.input("What is the default locale? (e.g. en, fr, en-US)")?;
        match LocaleCode::sanitize(&raw) {
            Ok(code) => return Ok(code),
            Err(e) => io.notify(Notice::Failed(&e.to_string())),
        }
    }
}

fn ask_additional(io: &mut dyn Prompter) -> Result<Vec<LocaleCode>> {
    loop {
        let raw = io.input("Which other locales? Comma-separated (e.g. fr, de-DE)")?;
        match parse_locale_list(&raw) {
            Ok(codes) => return Ok(codes),
            Err(e) => io.notify(Notice::Failed(&format!("{e}; please enter the list again"))),
        }
    }
}

fn collect_desired(opts: &RunOptions, io: &mut dyn Prompter) -> Result<(LocaleCode, LocaleSet)> {
    let (default, additional) = match &opts.default_locale {
        Some(raw) => {
            let default = LocaleCode::sanitize(raw)?;
            let mut additional = Vec::new();
            for raw in opts.locales.iter().flatten() {
                additional.extend(parse_locale_list(raw)?);
            }
            (default, additional)
        }
        None => {
            let multiple = io.confirm("Do you plan to use multiple languages?", false)?;
            io.notify(Notice::Info(&format!(
                "Locale examples can be seen at: {LOCALE_EXAMPLES_URL}"
            )));
            let default = ask_default(io)?;
            let additional = if multiple {
                ask_additional(io)?
            } else {
                Vec::new()
            };
            (default, additional)
        }
    };
    let desired = LocaleSet::desired(&default, &additional);
    Ok((default, desired))
}

fn preview(diff: &Diff, io: &mut dyn Prompter) {
    io.notify(Notice::Info(&format!(
        "Default locale: \"{}\"",
        diff.new_default()
    )));
    io.notify(Notice::Info(&format!("Locales: {}", diff.new_locales())));
    if !diff.to_add().is_empty() {
        io.notify(Notice::Info(&format!("Locales to add: {}", diff.to_add())));
    }
    if !diff.to_remove().is_empty() {
        io.notify(Notice::Info(&format!(
            "Locales to remove: {}",
            diff.to_remove()
        )));
    }
    if diff.rename_default() {
        io.notify(Notice::Info(&format!(
            "Default locale \"{}\" is renamed to \"{}\"",
            diff.old_default(),
            diff.new_default()
        )));
    }
    if diff.is_structural_noop() {
        io.notify(Notice::Info("No locale folders to add, remove or rename"));
    }
}

fn banner(title: &str) -> String {
    let rule = "=".repeat(title.len() + 2);
    format!("\n{rule}\n {title}\n{rule}\n")
}

struct Run<'a> {
    layout: &'a ProjectLayout,
    diff: &'a Diff,
    dry_run: bool,
    summary: RunSummary,
}

impl<'a> Run<'a> {
    fn show(&self, path: &Path) -> String {
        self.layout.display(path).into_owned()
    }

    fn commit(&mut self, r: &Rewritten, io: &mut dyn Prompter) -> Result<()> {
        let shown = self.show(&r.path);
        let status = if !r.changed() {
            io.notify(Notice::Info(&format!("{shown} already up to date")));
            "unchanged"
        } else if self.dry_run {
            io.notify(Notice::Info(&format!("would update {shown}")));
            "planned"
        } else {
            r.persist()?;
            tracing::info!(event = "artifact_updated", path = %shown);
            io.notify(Notice::Done(&format!("updated {shown}")));
            "updated"
        };
        self.summary.push_artifact(ArtifactReport {
            path: shown,
            status: status.to_string(),
            error: None,
        });
        Ok(())
    }

    fn fenced(&mut self, path: &Path, err: color_eyre::Report, io: &mut dyn Prompter) {
        let shown = self.show(path);
        tracing::error!(event = "artifact_failed", path = %shown, error = %format!("{err:#}"));
        io.notify(Notice::Failed(&format!("error updating {shown}: {err:#}")));
        self.summary.push_artifact(ArtifactReport {
            path: shown,
            status: "failed".to_string(),
            error: Some(format!("{err:#}")),
        });
    }

    fn missing(&mut self, path: &Path, io: &mut dyn Prompter) {
        let shown = self.show(path);
        tracing::warn!(event = "artifact_missing", path = %shown);
        io.notify(Notice::Warn(&format!("{shown} not found, skipped")));
        self.summary.push_artifact(ArtifactReport {
            path: shown,
            status: "missing".to_string(),
            error: None,
        });
    }

    /// Locale lists, keyed maps and translations. Everything is rendered
    /// before anything is written; any failure aborts the run.
    fn core_artifacts(&mut self, io: &mut dyn Prompter) -> Result<()> {
        let (layout, diff) = (self.layout, self.diff);
        let rendered = [
            rewrite::render_file(&layout.site_config, |d| rewrite::rewrite_locale_list(d, diff))?,
            rewrite::render_file(&layout.site_settings, |d| {
                rewrite::rewrite_locale_list(d, diff)?;
                rewrite::rewrite_keyed_maps(d, diff, &layout.keyed_maps)
            })?,
            rewrite::render_file(&layout.translations, |d| {
                rewrite::rewrite_translations(d, diff, &layout.translation_objects)
            })?,
        ];
        for r in &rendered {
            self.commit(r, io)?;
        }
        Ok(())
    }

    fn cms(&mut self, io: &mut dyn Prompter) {
        let layout = self.layout;
        let Some(path) = layout.cms_schema.as_deref() else {
            return;
        };
        if !path.exists() {
            self.missing(path, io);
            return;
        }
        let diff = self.diff;
        let res = rewrite::render_file(path, |d| rewrite::rewrite_cms(d, diff))
            .and_then(|r| self.commit(&r, io));
        if let Err(e) = res {
            self.fenced(path, e, io);
        }
    }

    fn record(&mut self, op: &DirOp, status: &str, error: Option<String>, io: &mut dyn Prompter) {
        let report = op.report(&self.layout.root, status, error);
        let line = match &report.from {
            Some(from) => format!("{} {} -> {}", report.kind, from, report.to),
            None => format!("{} {}", report.kind, report.to),
        };
        match (status, &report.error) {
            ("failed", Some(e)) => io.notify(Notice::Failed(&format!("error processing {line}: {e}"))),
            ("skipped", Some(why)) => io.notify(Notice::Warn(&format!("{line}: {why}"))),
            ("planned", _) => io.notify(Notice::Info(&format!("would {line}"))),
            _ => io.notify(Notice::Done(&line)),
        }
        self.summary.push_operation(report);
    }

    fn planned(&mut self, ops: &[DirOp], io: &mut dyn Prompter) {
        for op in ops {
            let status = if matches!(op, DirOp::Skip { .. }) { "skipped" } else { "planned" };
            self.record(op, status, None, io);
        }
    }

    fn applied(&mut self, applied: Vec<Applied>, io: &mut dyn Prompter) {
        for a in applied {
            let status = match (&a.op, &a.error) {
                (_, Some(_)) => "failed",
                (DirOp::Skip { .. }, None) => "skipped",
                _ => "done",
            };
            self.record(&a.op, status, a.error, io);
        }
    }

    fn content_dirs(&mut self, io: &mut dyn Prompter) {
        let plan = match mirror::plan_mirror(&self.layout.content_roots, self.diff) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!(event = "mirror_plan_failed", error = %format!("{e:#}"));
                io.notify(Notice::Failed(&format!("error scanning locale folders: {e:#}")));
                self.summary.failures += 1;
                return;
            }
        };
        if plan.is_empty() {
            tracing::debug!(event = "mirror_nothing_to_do");
            return;
        }
        if self.dry_run {
            self.planned(&plan.ops, io);
        } else {
            let applied = mirror::apply_mirror(&plan);
            self.applied(applied, io);
        }
    }

    fn routes(&mut self, io: &mut dyn Prompter) {
        let plan = mirror::plan_routes(&self.layout.routes_root, self.diff);
        if plan.ops.is_empty() {
            return;
        }
        if self.dry_run {
            self.planned(&plan.ops, io);
            return;
        }
        let applied = mirror::apply_routes(&plan);
        self.applied(applied, io);
        let shown = self.show(&self.layout.routes_root);
        io.notify(Notice::Done(&format!("updated the {shown}/[locale] folders")));
    }

    /// Quoted references to the old default in the new default's files.
    fn references(&mut self, io: &mut dyn Prompter) {
        if !self.diff.rename_default() {
            return;
        }
        let diff = self.diff;
        let (old, new) = (diff.old_default(), diff.new_default());
        for path in self.layout.reference_files_for(new.as_str()) {
            if self.dry_run {
                let shown = self.show(&path);
                io.notify(Notice::Info(&format!("would update references in {shown}")));
                self.summary.push_artifact(ArtifactReport {
                    path: shown,
                    status: "planned".to_string(),
                    error: None,
                });
                continue;
            }
            if !path.exists() {
                self.missing(&path, io);
                continue;
            }
            let res = rewrite::render_file(&path, |d| {
                d.replace_string_literal(old.as_str(), new.as_str());
                Ok(())
            })
            .and_then(|r| self.commit(&r, io));
            if let Err(e) = res {
                self.fenced(&path, e, io);
            }
        }
    }
}

/// Run the whole reconfiguration. Structural problems with the canonical
/// artifact and failures of the core rewrites are errors; failures in the
/// CMS schema, directories and reference files are reported and skipped.
pub fn configure(
    layout: &ProjectLayout,
    opts: &RunOptions,
    io: &mut dyn Prompter,
) -> Result<Outcome> {
    io.notify(Notice::Info(&banner(
        "This will configure the i18n settings of the project",
    )));
    let (old_default, old_locales) = read_current(layout)?;
    tracing::info!(event = "current_locales", default = %old_default, locales = %old_locales);

    let (new_default, desired) = collect_desired(opts, io)?;
    let diff = resolve(&old_locales, &old_default, &desired, &new_default);
    tracing::info!(
        event = "diff_resolved",
        to_add = %diff.to_add(),
        to_remove = %diff.to_remove(),
        rename_default = diff.rename_default(),
    );

    preview(&diff, io);
    if !opts.assume_yes && !opts.dry_run && !io.confirm("Is this correct?", false)? {
        tracing::info!(event = "run_cancelled");
        io.notify(Notice::Info("Please re-run relocale and try again."));
        return Ok(Outcome::Cancelled);
    }

    let mut run = Run {
        layout,
        diff: &diff,
        dry_run: opts.dry_run,
        summary: RunSummary::new(&diff, opts.dry_run),
    };
    run.core_artifacts(io)?;
    run.cms(io);
    run.content_dirs(io);
    run.routes(io);
    run.references(io);

    if opts.dry_run {
        io.notify(Notice::Info("Dry run: nothing was written."));
    } else {
        io.notify(Notice::Info(&banner("Configuration Complete!")));
        let settings = layout.display(&layout.site_settings);
        io.notify(Notice::Info("Next steps:"));
        io.notify(Notice::Info(&format!("1. Update 'localeMap' in {settings}")));
        io.notify(Notice::Info(&format!(
            "2. Update 'languageSwitcherMap' in {settings}"
        )));
        io.notify(Notice::Info(&format!(
            "3. Review your translation files in {}/[locale]/",
            layout.display(layout.translations.parent().unwrap_or(&layout.root))
        )));
    }
    tracing::info!(event = "run_finished", failures = run.summary.failures, dry_run = opts.dry_run);
    Ok(Outcome::Completed(run.summary))
}
