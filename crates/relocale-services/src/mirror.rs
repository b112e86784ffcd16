//! Locale-named directories under the content roots and the routes root.
//!
//! Walks produce a [`MirrorPlan`] first; applying it runs every copy, then
//! every removal, then every rename. Operations that land inside a planned
//! copy are part of the plan too, so the copies end up in the same shape as
//! the directories that existed before the run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use regex::Regex;
use relocale_core::{Diff, LocaleSet, RelocaleError};
use relocale_domain::DirOpReport;
use walkdir::WalkDir;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirOp {
    Copy { from: PathBuf, to: PathBuf },
    Remove { path: PathBuf },
    Rename { from: PathBuf, to: PathBuf },
    Skip { path: PathBuf, reason: String },
}

impl DirOp {
    pub fn kind(&self) -> &'static str {
        match self {
            DirOp::Copy { .. } => "copy",
            DirOp::Remove { .. } => "remove",
            DirOp::Rename { .. } => "rename",
            DirOp::Skip { .. } => "skip",
        }
    }

    fn phase(&self) -> u8 {
        match self {
            DirOp::Skip { .. } | DirOp::Copy { .. } => 0,
            DirOp::Remove { .. } => 1,
            DirOp::Rename { .. } => 2,
        }
    }

    /// Paths are shown relative to `root` when possible.
    pub fn report(&self, root: &Path, status: &str, error: Option<String>) -> DirOpReport {
        let show = |p: &Path| p.strip_prefix(root).unwrap_or(p).display().to_string();
        let (from, to) = match self {
            DirOp::Copy { from, to } | DirOp::Rename { from, to } => (Some(show(from)), show(to)),
            DirOp::Remove { path } | DirOp::Skip { path, .. } => (None, show(path)),
        };
        let error = match (self, error) {
            (_, Some(e)) => Some(e),
            (DirOp::Skip { reason, .. }, None) => Some(reason.clone()),
            _ => None,
        };
        DirOpReport {
            kind: self.kind().to_string(),
            from,
            to,
            status: status.to_string(),
            error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorPlan {
    pub ops: Vec<DirOp>,
}

impl MirrorPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn extend(&mut self, other: MirrorPlan) {
        self.ops.extend(other.ops);
    }
}

/// Result of one applied operation.
#[derive(Debug, Clone)]
pub struct Applied {
    pub op: DirOp,
    pub error: Option<String>,
}

fn names(set: &LocaleSet, name: &str) -> bool {
    set.iter().any(|c| c.as_str() == name)
}

/// Immediate subdirectories of `dir`, sorted by name.
fn subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.wrap_err_with(|| format!("failed to list {}", dir.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            out.push((name.to_string(), entry.into_path()));
        }
    }
    Ok(out)
}

struct Planner<'a> {
    diff: &'a Diff,
    /// Real source directory -> the copies planned from it.
    copies: HashMap<PathBuf, Vec<PathBuf>>,
    plan: MirrorPlan,
}

impl<'a> Planner<'a> {
    fn add(&mut self, dir: &Path) -> Result<()> {
        let diff = self.diff;
        let source = diff.clone_source().as_str();
        for (name, path) in subdirs(dir)? {
            if name != source {
                self.add(&path)?;
                continue;
            }
            for loc in diff.to_add() {
                let to = dir.join(loc.as_str());
                if to.exists() {
                    self.plan.ops.push(DirOp::Skip {
                        path: to,
                        reason: "target already exists".to_string(),
                    });
                } else {
                    self.copies.entry(path.clone()).or_default().push(to.clone());
                    self.plan.ops.push(DirOp::Copy {
                        from: path.clone(),
                        to,
                    });
                }
            }
        }
        Ok(())
    }

    /// `mirrors` are the places `real`'s children will exist at once the
    /// copies are done (`real` itself included when it survives).
    fn children(&self, real: &Path, name: &str, mirrors: &[PathBuf]) -> Vec<PathBuf> {
        let mut next: Vec<PathBuf> = mirrors.iter().map(|m| m.join(name)).collect();
        if let Some(extra) = self.copies.get(&real.join(name)) {
            next.extend(extra.iter().cloned());
        }
        next
    }

    fn remove(&mut self, real: &Path, mirrors: &[PathBuf]) -> Result<()> {
        for (name, path) in subdirs(real)? {
            if names(self.diff.to_remove(), &name) {
                for m in mirrors {
                    self.plan.ops.push(DirOp::Remove { path: m.join(&name) });
                }
                continue;
            }
            let next = self.children(real, &name, mirrors);
            if !next.is_empty() {
                self.remove(&path, &next)?;
            }
        }
        Ok(())
    }

    fn rename(&mut self, real: &Path, mirrors: &[PathBuf]) -> Result<()> {
        let diff = self.diff;
        let (old, new) = (diff.old_default().as_str(), diff.new_default().as_str());
        for (name, path) in subdirs(real)? {
            if names(diff.to_remove(), &name) {
                continue;
            }
            if name == old {
                for m in mirrors {
                    let from = m.join(&name);
                    let to = m.join(new);
                    if to.exists() {
                        self.plan.ops.push(DirOp::Skip {
                            path: to,
                            reason: "rename target already exists".to_string(),
                        });
                    } else {
                        self.plan.ops.push(DirOp::Rename { from, to });
                    }
                }
                // a renamed directory is not descended, its copies are
                let copies = self.copies.get(&path).cloned().unwrap_or_default();
                if !copies.is_empty() {
                    self.rename(&path, &copies)?;
                }
                continue;
            }
            let next = self.children(real, &name, mirrors);
            if !next.is_empty() {
                self.rename(&path, &next)?;
            }
        }
        Ok(())
    }
}

/// Plan the add, remove and rename passes for one content root.
pub fn plan_root(root: &Path, diff: &Diff) -> Result<MirrorPlan> {
    let mut p = Planner {
        diff,
        copies: HashMap::new(),
        plan: MirrorPlan::default(),
    };
    if !root.is_dir() {
        tracing::debug!(event = "mirror_root_missing", root = %root.display());
        return Ok(p.plan);
    }
    let top = [root.to_path_buf()];
    if !diff.to_add().is_empty() {
        p.add(root)?;
    }
    if !diff.to_remove().is_empty() {
        p.remove(root, &top)?;
    }
    if diff.rename_default() {
        p.rename(root, &top)?;
    }
    Ok(p.plan)
}

pub fn plan_mirror(roots: &[PathBuf], diff: &Diff) -> Result<MirrorPlan> {
    let mut plan = MirrorPlan::default();
    for root in roots {
        plan.extend(plan_root(root, diff)?);
    }
    tracing::debug!(event = "mirror_planned", ops = plan.ops.len());
    Ok(plan)
}

/// Deep copy of `src` into a new directory `dst`. An existing `dst` is
/// never overwritten.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        return Err(RelocaleError::TargetExists(dst.to_path_buf()).into());
    }
    for entry in WalkDir::new(src) {
        let entry = entry.wrap_err_with(|| format!("failed to walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .wrap_err("walk escaped its root")?;
        let target = dst.join(rel);
        let ft = entry.file_type();
        if ft.is_dir() {
            fs::create_dir_all(&target)
                .wrap_err_with(|| format!("failed to create {}", target.display()))?;
        } else if ft.is_file() {
            fs::copy(entry.path(), &target)
                .wrap_err_with(|| format!("failed to copy {}", entry.path().display()))?;
        } else {
            tracing::debug!(event = "copy_skip_special", path = %entry.path().display());
        }
    }
    Ok(())
}

fn run_op(op: &DirOp) -> Result<()> {
    match op {
        DirOp::Copy { from, to } => copy_dir_recursive(from, to),
        DirOp::Remove { path } => match fs::remove_dir_all(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other.wrap_err_with(|| format!("failed to remove {}", path.display())),
        },
        DirOp::Rename { from, to } => {
            if to.exists() {
                return Err(RelocaleError::TargetExists(to.clone()).into());
            }
            fs::rename(from, to)
                .wrap_err_with(|| format!("failed to rename {} to {}", from.display(), to.display()))
        }
        DirOp::Skip { .. } => Ok(()),
    }
}

/// Apply operations phase by phase (copies, removals, renames). A failure is
/// logged and recorded; the remaining operations still run. `after_copy` runs
/// for every successful copy.
pub fn apply_ops(
    ops: &[DirOp],
    mut after_copy: impl FnMut(&Path, &Path) -> Result<()>,
) -> Vec<Applied> {
    let mut ordered: Vec<&DirOp> = ops.iter().collect();
    ordered.sort_by_key(|op| op.phase());
    let mut out = Vec::with_capacity(ordered.len());
    for op in ordered {
        let mut res = run_op(op);
        if res.is_ok() {
            if let DirOp::Copy { from, to } = op {
                res = after_copy(from, to);
            }
        }
        let error = match res {
            Ok(()) => {
                tracing::info!(event = "dir_op_done", kind = op.kind(), op = ?op);
                None
            }
            Err(e) => {
                tracing::error!(event = "dir_op_failed", kind = op.kind(), op = ?op, error = %format!("{e:#}"));
                Some(format!("{e:#}"))
            }
        };
        out.push(Applied {
            op: op.clone(),
            error,
        });
    }
    out
}

pub fn apply_mirror(plan: &MirrorPlan) -> Vec<Applied> {
    apply_ops(&plan.ops, |_, _| Ok(()))
}

/// Route directories live directly under the routes root, one per
/// non-default locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutesPlan {
    /// Existing locale directory the new route trees are copied from.
    pub source: Option<String>,
    pub ops: Vec<DirOp>,
}

pub fn plan_routes(routes_root: &Path, diff: &Diff) -> RoutesPlan {
    let mut plan = RoutesPlan::default();
    if !routes_root.is_dir() {
        tracing::debug!(event = "routes_root_missing", root = %routes_root.display());
        return plan;
    }
    plan.source = diff
        .old_locales()
        .iter()
        .map(|l| l.as_str().to_string())
        .find(|l| routes_root.join(l).is_dir());
    if let Some(src) = &plan.source {
        for loc in diff.to_add() {
            let to = routes_root.join(loc.as_str());
            if to.exists() {
                plan.ops.push(DirOp::Skip {
                    path: to,
                    reason: "target already exists".to_string(),
                });
            } else {
                plan.ops.push(DirOp::Copy {
                    from: routes_root.join(src),
                    to,
                });
            }
        }
    } else if !diff.to_add().is_empty() {
        tracing::debug!(event = "routes_no_source", root = %routes_root.display());
    }
    for loc in diff.to_remove() {
        let path = routes_root.join(loc.as_str());
        if path.is_dir() {
            plan.ops.push(DirOp::Remove { path });
        }
    }
    plan
}

/// Copies, then the quoted-code rewrite inside each new copy, then removals.
pub fn apply_routes(plan: &RoutesPlan) -> Vec<Applied> {
    let Some(src) = plan.source.as_deref() else {
        return apply_ops(&plan.ops, |_, _| Ok(()));
    };
    apply_ops(&plan.ops, |_, to| {
        let Some(loc) = to.file_name().and_then(|n| n.to_str()) else {
            return Ok(());
        };
        let n = rewrite_route_references(to, src, loc)?;
        tracing::debug!(event = "route_refs_rewritten", dir = %to.display(), files = n);
        Ok(())
    })
}

/// Replace every `'from'` / `"from"` with `"to"` in the text files under
/// `dir`. Returns the number of files written.
pub fn rewrite_route_references(dir: &Path, from: &str, to: &str) -> Result<usize> {
    let re = Regex::new(&format!(r#"['"]{}['"]"#, regex::escape(from)))?;
    let replacement = format!("\"{to}\"");
    let mut written = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry.wrap_err_with(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let text = match fs::read_to_string(entry.path()) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::debug!(event = "route_ref_skip", path = %entry.path().display(), reason = "not utf-8");
                continue;
            }
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("failed to read {}", entry.path().display()))
            }
        };
        let out = re.replace_all(&text, replacement.as_str());
        if out != text {
            fs::write(entry.path(), out.as_bytes())
                .wrap_err_with(|| format!("failed to write {}", entry.path().display()))?;
            written += 1;
        }
    }
    Ok(written)
}
