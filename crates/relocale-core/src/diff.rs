use crate::{LocaleCode, LocaleSet};

/// The single decision every rewriter and the directory mirror act on.
///
/// Built once by [`resolve`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    to_add: LocaleSet,
    to_remove: LocaleSet,
    rename_default: bool,
    old_default: LocaleCode,
    new_default: LocaleCode,
    old_locales: LocaleSet,
    new_locales: LocaleSet,
}

impl Diff {
    pub fn to_add(&self) -> &LocaleSet {
        &self.to_add
    }

    pub fn to_remove(&self) -> &LocaleSet {
        &self.to_remove
    }

    /// When set, every occurrence of the old default's key becomes the new
    /// default's key. The default is never deleted and re-added.
    pub fn rename_default(&self) -> bool {
        self.rename_default
    }

    pub fn old_default(&self) -> &LocaleCode {
        &self.old_default
    }

    pub fn new_default(&self) -> &LocaleCode {
        &self.new_default
    }

    pub fn old_locales(&self) -> &LocaleSet {
        &self.old_locales
    }

    /// The desired set, rendered into locale array literals.
    pub fn new_locales(&self) -> &LocaleSet {
        &self.new_locales
    }

    /// Additions are cloned from the current default's content, which is
    /// still present under its old name while additions run.
    pub fn clone_source(&self) -> &LocaleCode {
        &self.old_default
    }

    /// Nothing to add, remove or rename. The locale-list scalars may still
    /// change (e.g. the default moves to an existing locale).
    pub fn is_structural_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty() && !self.rename_default
    }
}

/// Compute the locale diff between the current and the desired configuration.
///
/// Three cases, first match wins:
/// 1. the new default already exists: plain set differences;
/// 2. the old default survives in the new set: plain set differences;
/// 3. otherwise the default itself is renamed, and neither default appears in
///    the add/remove lists.
pub fn resolve(
    old_locales: &LocaleSet,
    old_default: &LocaleCode,
    new_locales: &LocaleSet,
    new_default: &LocaleCode,
) -> Diff {
    let plain = old_locales.contains(new_default) || new_locales.contains(old_default);

    let (to_add, to_remove) = if plain {
        (
            new_locales.difference(old_locales),
            old_locales.difference(new_locales),
        )
    } else {
        (
            new_locales.difference(old_locales).without(new_default),
            old_locales.difference(new_locales).without(old_default),
        )
    };

    Diff {
        to_add,
        to_remove,
        rename_default: !plain,
        old_default: old_default.clone(),
        new_default: new_default.clone(),
        old_locales: old_locales.clone(),
        new_locales: new_locales.clone(),
    }
}
