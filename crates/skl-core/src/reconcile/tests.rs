//! Tests for the reconcile module.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};

use super::*;

fn map(entries: &[(&str, &str)]) -> SkillMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Records calls and fails for configured keys.
#[derive(Default)]
struct RecordingActions {
    calls: RefCell<Vec<String>>,
    fail_remove: HashSet<String>,
    fail_install: HashSet<String>,
}

impl RecordingActions {
    fn failing_install(keys: &[&str]) -> Self {
        Self {
            fail_install: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    fn failing_remove(keys: &[&str]) -> Self {
        Self {
            fail_remove: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl PackageActions for RecordingActions {
    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(format!("remove {}", key));
        if self.fail_remove.contains(key) {
            anyhow::bail!("permission denied removing {}", key);
        }
        Ok(())
    }

    fn install(&self, key: &str, reference: &str) -> anyhow::Result<String> {
        self.calls
            .borrow_mut()
            .push(format!("install {} {}", key, reference));
        if self.fail_install.contains(key) {
            anyhow::bail!("repository not found for {}", key);
        }
        Ok(format!("hash-of-{}", reference))
    }
}

mod diff_tests {
    use super::*;

    #[test]
    fn identical_maps_produce_empty_plan() {
        let cases = [
            map(&[]),
            map(&[("github@acme/x/a", "v1")]),
            map(&[("github@acme/x/a", "*"), ("local@notes", "*")]),
        ];
        for m in &cases {
            let plan = diff(m, m);
            assert!(plan.is_empty(), "expected empty plan for {:?}", m);
        }
    }

    #[test]
    fn scenario_upgrade_and_remove() {
        let desired = map(&[("github@acme/x/a", "v1")]);
        let locked = map(&[("github@acme/x/a", "v0"), ("github@acme/x/b", "*")]);

        let plan = diff(&desired, &locked);
        assert_eq!(plan.to_upgrade, vec!["github@acme/x/a"]);
        assert_eq!(plan.to_remove, vec!["github@acme/x/b"]);
        assert!(plan.to_install.is_empty());
    }

    #[test]
    fn sentinel_is_compared_as_a_string() {
        let desired = map(&[("github@acme/x/a", "*")]);
        let locked = map(&[("github@acme/x/a", "0123abcd")]);

        let plan = diff(&desired, &locked);
        assert_eq!(plan.to_upgrade, vec!["github@acme/x/a"]);
    }

    #[test]
    fn plan_partitions_changed_keys() {
        let desired = map(&[
            ("a", "1"),
            ("b", "2"),
            ("c", "3"),
            ("e", "*"),
            ("f", "same"),
        ]);
        let locked = map(&[("b", "2"), ("c", "old"), ("d", "4"), ("f", "same")]);

        let plan = diff(&desired, &locked);
        assert_eq!(plan.to_install, vec!["a", "e"]);
        assert_eq!(plan.to_remove, vec!["d"]);
        assert_eq!(plan.to_upgrade, vec!["c"]);

        let install: BTreeSet<_> = plan.to_install.iter().collect();
        let remove: BTreeSet<_> = plan.to_remove.iter().collect();
        let upgrade: BTreeSet<_> = plan.to_upgrade.iter().collect();
        assert!(install.is_disjoint(&remove));
        assert!(install.is_disjoint(&upgrade));
        assert!(remove.is_disjoint(&upgrade));

        // Every key whose state differs is covered; unchanged keys are not.
        let all_keys: BTreeSet<&String> = desired.keys().chain(locked.keys()).collect();
        for key in all_keys {
            let changed = desired.get(key) != locked.get(key);
            let planned = install.contains(key) || remove.contains(key) || upgrade.contains(key);
            assert_eq!(changed, planned, "key {}", key);
        }
    }

    #[test]
    fn empty_lock_installs_everything() {
        let desired = map(&[("b", "*"), ("a", "v1")]);
        let plan = diff(&desired, &map(&[]));
        assert_eq!(plan.to_install, vec!["a", "b"]);
        assert_eq!(plan.total(), 2);
    }

    #[test]
    fn empty_manifest_removes_everything() {
        let locked = map(&[("a", "x"), ("b", "y")]);
        let plan = diff(&map(&[]), &locked);
        assert_eq!(plan.to_remove, vec!["a", "b"]);
    }
}

mod refresh_tests {
    use super::*;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn hash_against_symbolic_ref_is_a_refresh() {
        assert!(is_symbolic_refresh(SHA, "*"));
        assert!(is_symbolic_refresh(SHA, "v1.2.0"));
        assert!(is_symbolic_refresh(SHA, "main"));
    }

    #[test]
    fn real_changes_are_not_refreshes() {
        let other = "fedcba9876543210fedcba9876543210fedcba98";
        assert!(!is_symbolic_refresh("v1", "v2"));
        assert!(!is_symbolic_refresh("*", "v1"));
        assert!(!is_symbolic_refresh(SHA, other));
    }

    #[test]
    fn resolved_lock_still_plans_an_upgrade() {
        let plan = diff(
            &map(&[("github@acme/tools/fmt", "*")]),
            &map(&[("github@acme/tools/fmt", SHA)]),
        );
        assert_eq!(plan.to_upgrade, vec!["github@acme/tools/fmt"]);
    }

    #[test]
    fn commit_hash_shape() {
        assert!(is_commit_hash(SHA));
        assert!(!is_commit_hash(&SHA[..39]));
        assert!(!is_commit_hash("zz23456789abcdef0123456789abcdef01234567"));
    }
}

mod reconcile_tests {
    use super::*;

    #[test]
    fn scenario_writes_resolved_lock() {
        let desired = map(&[("github@acme/x/a", "v1")]);
        let locked = map(&[("github@acme/x/a", "v0"), ("github@acme/x/b", "*")]);
        let actions = RecordingActions::default();

        let report = reconcile(&desired, &locked, &actions);

        assert_eq!(report.lock, map(&[("github@acme/x/a", "hash-of-v1")]));
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 0);
        assert_eq!(
            actions.calls(),
            vec![
                "remove github@acme/x/b",
                "remove github@acme/x/a",
                "install github@acme/x/a v1",
            ]
        );
    }

    #[test]
    fn actions_run_remove_upgrade_install_in_order() {
        let desired = map(&[("c-new", "*"), ("a-new", "*"), ("m-up", "v2")]);
        let locked = map(&[("z-old", "x"), ("b-old", "y"), ("m-up", "v1")]);
        let actions = RecordingActions::default();

        let report = reconcile(&desired, &locked, &actions);
        let kinds: Vec<_> = report.outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Remove,
                ActionKind::Remove,
                ActionKind::Upgrade,
                ActionKind::Install,
                ActionKind::Install,
            ]
        );
        assert_eq!(
            actions.calls(),
            vec![
                "remove b-old",
                "remove z-old",
                "remove m-up",
                "install m-up v2",
                "install a-new *",
                "install c-new *",
            ]
        );
    }

    #[test]
    fn failed_install_is_left_out_of_lock_and_siblings_continue() {
        let desired = map(&[("a", "v1"), ("b", "v1"), ("c", "v1")]);
        let locked = map(&[]);
        let actions = RecordingActions::failing_install(&["b"]);

        let report = reconcile(&desired, &locked, &actions);

        assert_eq!(report.lock, map(&[("a", "hash-of-v1"), ("c", "hash-of-v1")]));
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);

        let failure = report.failures().next().unwrap();
        assert_eq!(failure.key, "b");
        assert!(
            failure
                .error
                .as_ref()
                .unwrap()
                .to_string()
                .contains("repository not found")
        );
    }

    #[test]
    fn failed_upgrade_install_drops_key() {
        let desired = map(&[("a", "v2")]);
        let locked = map(&[("a", "v1")]);
        let actions = RecordingActions::failing_install(&["a"]);

        let report = reconcile(&desired, &locked, &actions);

        assert!(report.lock.is_empty());
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcomes[0].from.as_deref(), Some("v1"));
        assert_eq!(report.outcomes[0].to.as_deref(), Some("v2"));
    }

    #[test]
    fn failed_upgrade_removal_keeps_old_lock_entry() {
        let desired = map(&[("a", "v2")]);
        let locked = map(&[("a", "v1")]);
        let actions = RecordingActions::failing_remove(&["a"]);

        let report = reconcile(&desired, &locked, &actions);

        assert_eq!(report.lock, map(&[("a", "v1")]));
        assert_eq!(actions.calls(), vec!["remove a"]);
    }

    #[test]
    fn failed_removal_keeps_lock_entry() {
        let desired = map(&[]);
        let locked = map(&[("a", "abc"), ("b", "def")]);
        let actions = RecordingActions::failing_remove(&["a"]);

        let report = reconcile(&desired, &locked, &actions);

        assert_eq!(report.lock, map(&[("a", "abc")]));
        assert_eq!(report.succeeded(), 1);
    }

    #[test]
    fn unchanged_keys_keep_locked_value_without_actions() {
        let desired = map(&[("a", "*"), ("b", "v1")]);
        let locked = map(&[("a", "*"), ("b", "v0")]);
        let actions = RecordingActions::default();

        let report = reconcile(&desired, &locked, &actions);

        assert_eq!(report.lock, map(&[("a", "*"), ("b", "hash-of-v1")]));
        assert_eq!(report.total(), 1);
        assert!(!actions.calls().iter().any(|c| c.contains(" a")));
    }

    #[test]
    fn synced_state_does_nothing() {
        let state = map(&[("a", "*"), ("b", "v1")]);
        let actions = RecordingActions::default();

        let report = reconcile(&state, &state, &actions);

        assert!(report.plan.is_empty());
        assert_eq!(report.lock, state);
        assert!(actions.calls().is_empty());
    }
}
