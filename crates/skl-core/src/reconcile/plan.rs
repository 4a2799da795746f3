//! Pure diff between desired and locked state.

use crate::state::SkillMap;

/// Actions needed to move the lock to the desired state.
///
/// The three sets are disjoint and each is sorted lexicographically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// In desired, absent from locked.
    pub to_install: Vec<String>,
    /// In locked, absent from desired.
    pub to_remove: Vec<String>,
    /// In both with a different ref string.
    pub to_upgrade: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.to_install.len() + self.to_remove.len() + self.to_upgrade.len()
    }
}

/// Compare desired against locked.
///
/// Refs are compared as plain strings: `*` is not normalized, so a
/// manifest ref that differs in spelling from its lock entry is an upgrade.
pub fn diff(desired: &SkillMap, locked: &SkillMap) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    for (key, desired_ref) in desired {
        match locked.get(key) {
            None => plan.to_install.push(key.clone()),
            Some(locked_ref) if locked_ref != desired_ref => plan.to_upgrade.push(key.clone()),
            Some(_) => {}
        }
    }

    plan.to_remove = locked
        .keys()
        .filter(|key| !desired.contains_key(*key))
        .cloned()
        .collect();

    plan
}

/// Whether `value` is a full commit hash as written to the lock.
pub fn is_commit_hash(value: &str) -> bool {
    value.len() == 40 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// An upgrade whose only cause is a resolved commit in the lock standing
/// against a symbolic ref (or `*`) in the manifest.
///
/// Such keys never compare equal, so every update reinstalls them.
pub fn is_symbolic_refresh(locked: &str, desired: &str) -> bool {
    is_commit_hash(locked) && !is_commit_hash(desired)
}
