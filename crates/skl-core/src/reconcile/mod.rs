//! Reconciliation of the desired manifest against the resolved lock.
//!
//! [`diff`] is a pure function over the two mappings. [`reconcile`] drives a
//! [`PackageActions`] implementation through the resulting plan and builds
//! the next lock from what actually succeeded:
//!
//! - unchanged keys keep their locked value
//! - a successful install or upgrade records the value the installer returns
//! - a failed install or upgrade leaves the key out of the lock
//! - a failed removal keeps the previously locked value

mod plan;

use std::fmt;

use crate::state::SkillMap;

pub use plan::{ReconcilePlan, diff, is_commit_hash, is_symbolic_refresh};

/// Side effects needed to apply a plan, one package key at a time.
pub trait PackageActions {
    /// Delete the materialized package. Absence is not an error.
    fn remove(&self, key: &str) -> anyhow::Result<()>;

    /// Materialize the package at `reference` (`*` for latest).
    ///
    /// Returns the value to record in the lock.
    fn install(&self, key: &str, reference: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Remove,
    Upgrade,
    Install,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Remove => "remove",
            Self::Upgrade => "upgrade",
            Self::Install => "install",
        };
        f.write_str(label)
    }
}

/// Result of one action in a batch.
#[derive(Debug)]
pub struct ActionOutcome {
    pub key: String,
    pub kind: ActionKind,
    /// Locked value before the action.
    pub from: Option<String>,
    /// Desired value (for upgrades and installs).
    pub to: Option<String>,
    /// Value written to the lock, when the action succeeded.
    pub locked: Option<String>,
    pub error: Option<anyhow::Error>,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything a batch did, plus the lock to persist.
#[derive(Debug)]
pub struct ReconcileReport {
    pub plan: ReconcilePlan,
    pub outcomes: Vec<ActionOutcome>,
    pub lock: SkillMap,
}

impl ReconcileReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Apply the diff between `desired` and `locked`.
///
/// Removals run first, then upgrades (remove followed by install), then
/// installs. A failure on one key never stops the others.
pub fn reconcile(
    desired: &SkillMap,
    locked: &SkillMap,
    actions: &dyn PackageActions,
) -> ReconcileReport {
    let plan = diff(desired, locked);

    let mut lock: SkillMap = desired
        .iter()
        .filter(|(key, value)| locked.get(*key) == Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let mut outcomes = Vec::with_capacity(plan.total());

    for key in &plan.to_remove {
        let previous = locked.get(key).cloned();
        tracing::info!("Removing {}", key);
        let error = actions.remove(key).err();
        if error.is_some()
            && let Some(previous) = &previous
        {
            lock.insert(key.clone(), previous.clone());
        }
        outcomes.push(ActionOutcome {
            key: key.clone(),
            kind: ActionKind::Remove,
            from: previous,
            to: None,
            locked: None,
            error,
        });
    }

    for key in &plan.to_upgrade {
        let previous = locked.get(key).cloned();
        let target = desired.get(key).cloned().unwrap_or_default();
        match previous.as_deref() {
            Some(locked_ref) if is_symbolic_refresh(locked_ref, &target) => tracing::info!(
                "Reinstalling {}: lock pins commit {} but the manifest asks for {:?}",
                key,
                locked_ref,
                target
            ),
            _ => tracing::info!(
                "Upgrading {} ({} -> {})",
                key,
                previous.as_deref().unwrap_or("-"),
                target
            ),
        }

        let mut outcome = ActionOutcome {
            key: key.clone(),
            kind: ActionKind::Upgrade,
            from: previous.clone(),
            to: Some(target.clone()),
            locked: None,
            error: None,
        };

        if let Err(err) = actions.remove(key) {
            // The old version is still on disk.
            if let Some(previous) = previous {
                lock.insert(key.clone(), previous);
            }
            outcome.error = Some(err);
            outcomes.push(outcome);
            continue;
        }

        match actions.install(key, &target) {
            Ok(resolved) => {
                lock.insert(key.clone(), resolved.clone());
                outcome.locked = Some(resolved);
            }
            Err(err) => outcome.error = Some(err),
        }
        outcomes.push(outcome);
    }

    for key in &plan.to_install {
        let target = desired.get(key).cloned().unwrap_or_default();
        tracing::info!("Installing {} ({})", key, target);

        let mut outcome = ActionOutcome {
            key: key.clone(),
            kind: ActionKind::Install,
            from: None,
            to: Some(target.clone()),
            locked: None,
            error: None,
        };
        match actions.install(key, &target) {
            Ok(resolved) => {
                lock.insert(key.clone(), resolved.clone());
                outcome.locked = Some(resolved);
            }
            Err(err) => outcome.error = Some(err),
        }
        outcomes.push(outcome);
    }

    ReconcileReport {
        plan,
        outcomes,
        lock,
    }
}

#[cfg(test)]
mod tests;
