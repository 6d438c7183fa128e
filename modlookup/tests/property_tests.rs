//! Property-based tests for split package merging.
//!
//! Uses proptest to generate random candidate lists and verify invariants hold.

use modlookup::{LookupEnvironment, ModuleId, PackageId, PackagePath, PackageRef};
use proptest::prelude::*;

/// An environment where each of `n` modules declares `com.foo`.
fn world(n: usize) -> (LookupEnvironment, Vec<ModuleId>, Vec<PackageId>) {
    let mut env = LookupEnvironment::new();
    let foo = PackagePath::parse("com.foo").unwrap();
    let mut modules = Vec::new();
    let mut packages = Vec::new();
    for i in 0..n {
        let module = env.add_module(format!("m{i}"));
        packages.push(env.declare_package(module, &foo).unwrap());
        modules.push(module);
    }
    (env, modules, packages)
}

/// Strategy for a module count and picks into it (repeats allowed)
fn module_picks() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..6).prop_flat_map(|n| (Just(n), prop::collection::vec(0..n, 1..12)))
}

/// Strategy for a non-plain candidate
fn weak_candidate() -> impl Strategy<Value = Option<PackageRef>> {
    prop_oneof![Just(None), Just(Some(PackageRef::NotFound))]
}

fn first_seen(picks: &[usize]) -> Vec<usize> {
    let mut seen = Vec::new();
    for &p in picks {
        if !seen.contains(&p) {
            seen.push(p);
        }
    }
    seen
}

/// Declaring modules equal the incarnations' enclosing modules.
fn in_sync(env: &LookupEnvironment, package: PackageId) -> bool {
    let from_incarnations: Vec<ModuleId> = env
        .package(package)
        .incarnations()
        .iter()
        .map(|&inc| env.package(inc).enclosing_module())
        .collect();
    env.declaring_modules(package) == from_incarnations
}

proptest! {
    /// combine_all never hands out a singleton split
    #[test]
    fn combine_all_never_singleton((n, picks) in module_picks(), weak in prop::collection::vec(weak_candidate(), 0..4)) {
        let (mut env, modules, packages) = world(n);
        let mut candidates: Vec<_> = picks.iter().map(|&i| Some(PackageRef::Package(packages[i]))).collect();
        candidates.extend(weak);

        let result = env.combine_all(&candidates, modules[0]).and_then(PackageRef::package);
        let result = result.expect("valid candidates always produce a binding");
        let distinct = first_seen(&picks);

        if distinct.len() == 1 {
            prop_assert_eq!(result, packages[distinct[0]]);
        } else {
            prop_assert!(env.package(result).is_split());
            let expected: Vec<PackageId> = distinct.iter().map(|&i| packages[i]).collect();
            prop_assert_eq!(env.package(result).incarnations(), expected);
            prop_assert!(in_sync(&env, result));
        }
    }

    /// Repeated adds leave the split unchanged
    #[test]
    fn add_is_idempotent((n, picks) in module_picks()) {
        let (mut env, modules, packages) = world(n);
        let all: Vec<_> = packages.iter().map(|&p| Some(PackageRef::Package(p))).collect();
        let Some(PackageRef::Package(merged)) = env.combine_all(&all, modules[0]) else {
            return Ok(());
        };
        if n == 1 {
            prop_assert_eq!(merged, packages[0]);
            return Ok(());
        }
        let before = env.package(merged).incarnations();
        for &i in &picks {
            env.add_to_split(merged, packages[i]);
            env.add_to_split(merged, merged);
        }
        prop_assert_eq!(env.package(merged).incarnations(), before);
        prop_assert!(in_sync(&env, merged));
        for &inc in &env.package(merged).incarnations() {
            let wrapping = env.package(inc).wrapping_splits();
            prop_assert_eq!(wrapping.iter().filter(|&&s| s == merged).count(), 1);
        }
    }

    /// combine keeps whichever side already covers the other
    #[test]
    fn combine_respects_subsumption((n, picks) in module_picks()) {
        let (mut env, modules, packages) = world(n);
        let candidates: Vec<_> = picks.iter().map(|&i| Some(PackageRef::Package(packages[i]))).collect();
        let covering = env.combine_all(&candidates, modules[0]);
        let covered = Some(PackageRef::Package(packages[picks[0]]));

        prop_assert_eq!(env.combine(covered, covering, modules[0]), covering);
        prop_assert_eq!(env.combine(covering, covered, modules[0]), covering);
    }

    /// The better rank always wins
    #[test]
    fn combine_prefers_valid(weak in weak_candidate(), valid_first in any::<bool>()) {
        let (mut env, modules, packages) = world(1);
        let valid = Some(PackageRef::Package(packages[0]));

        let result = if valid_first {
            env.combine(valid, weak, modules[0])
        } else {
            env.combine(weak, valid, modules[0])
        };
        prop_assert_eq!(result, valid);
    }
}
