//! Property tests for build order preservation

use kiln_build::{emit_aggregator, BuildOrder};
use kiln_config::{
    Compiler, Dependency, Language, ProjectDescriptor, TargetDescriptor, TargetKind, TargetList,
};
use proptest::prelude::*;

fn target_names() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set("[a-z][a-z0-9_]{0,11}", 1..12)
        .prop_map(|names| names.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

fn project(names: &[String], link_previous: bool) -> ProjectDescriptor {
    let targets = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let kind = if i + 1 == names.len() {
                TargetKind::Binary
            } else {
                TargetKind::StaticLibrary
            };
            let mut target = TargetDescriptor::new(name.as_str(), kind);
            if link_previous && i > 0 {
                target = target.with_dependency(Dependency::new(names[i - 1].as_str()));
            }
            target
        })
        .collect();

    ProjectDescriptor::new(
        names[names.len() - 1].as_str(),
        Language::Cxx,
        "20",
        Compiler::Gcc,
        "x64-linux",
        TargetList::new(targets).unwrap(),
    )
}

proptest! {
    #[test]
    fn aggregator_follows_declared_order(names in target_names(), link_previous in any::<bool>()) {
        let project = project(&names, link_previous);
        let order = BuildOrder::new(&project).unwrap();

        prop_assert_eq!(order.names(), names.iter().map(String::as_str).collect::<Vec<_>>());

        let text = emit_aggregator(&order);
        let subdirectories: Vec<String> = text
            .lines()
            .filter_map(|l| l.strip_prefix("add_subdirectory(\"src/"))
            .map(|l| l.trim_end_matches("\")").to_string())
            .collect();
        prop_assert_eq!(subdirectories, names);
    }

    #[test]
    fn backward_links_are_never_forward_references(names in target_names()) {
        let project = project(&names, true);
        let order = BuildOrder::new(&project).unwrap();
        prop_assert!(order.forward_references().is_empty());
    }
}
