use relocale_core::{Diff, LocaleCode, LocaleSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Current locale configuration as read from the canonical artifact.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LocaleStatus {
    pub schema_version: u32,
    pub source: String,
    pub default_locale: LocaleCode,
    pub locales: LocaleSet,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiffReport {
    pub schema_version: u32,
    pub old_default: LocaleCode,
    pub new_default: LocaleCode,
    pub locales: LocaleSet,
    pub to_add: LocaleSet,
    pub to_remove: LocaleSet,
    pub rename_default: bool,
}

impl From<&Diff> for DiffReport {
    fn from(d: &Diff) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            old_default: d.old_default().clone(),
            new_default: d.new_default().clone(),
            locales: d.new_locales().clone(),
            to_add: d.to_add().clone(),
            to_remove: d.to_remove().clone(),
            rename_default: d.rename_default(),
        }
    }
}

/// Outcome of one configuration artifact rewrite.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactReport {
    pub path: String,
    /// "updated" | "unchanged" | "planned" | "failed" | "missing"
    pub status: String,
    pub error: Option<String>,
}

/// One planned or applied directory operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DirOpReport {
    /// "copy" | "remove" | "rename" | "skip"
    pub kind: String,
    pub from: Option<String>,
    pub to: String,
    /// "planned" | "done" | "skipped" | "failed"
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub schema_version: u32,
    pub dry_run: bool,
    pub diff: DiffReport,
    pub artifacts: Vec<ArtifactReport>,
    pub operations: Vec<DirOpReport>,
    pub failures: usize,
}

impl RunSummary {
    pub fn new(diff: &Diff, dry_run: bool) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            dry_run,
            diff: DiffReport::from(diff),
            artifacts: Vec::new(),
            operations: Vec::new(),
            failures: 0,
        }
    }

    pub fn push_artifact(&mut self, report: ArtifactReport) {
        if report.status == "failed" {
            self.failures += 1;
        }
        self.artifacts.push(report);
    }

    pub fn push_operation(&mut self, report: DirOpReport) {
        if report.status == "failed" {
            self.failures += 1;
        }
        self.operations.push(report);
    }
}
