// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn driving_question_needs_scenario() {
    assert_eq!(
        required_deps(StageType::DrivingQuestion, EntryPoint::Scenario),
        vec![StageType::Scenario]
    );
}

#[test]
fn tool_seed_entry_prepends_tool_seed_deps() {
    assert_eq!(
        required_deps(StageType::Activity, EntryPoint::ToolSeed),
        vec![StageType::ToolSeed, StageType::QuestionChain]
    );
    assert_eq!(
        required_deps(StageType::Activity, EntryPoint::Scenario),
        vec![StageType::QuestionChain]
    );
}

#[test]
fn scenario_has_no_deps_on_scenario_entry() {
    assert!(required_deps(StageType::Scenario, EntryPoint::Scenario).is_empty());
    assert_eq!(
        required_deps(StageType::Scenario, EntryPoint::ToolSeed),
        vec![StageType::ToolSeed]
    );
}

#[test]
fn missing_chain_walks_back_to_first_gap() {
    let chain = missing_chain(StageType::Experiment, EntryPoint::Scenario, &[]).unwrap();
    assert_eq!(
        chain,
        vec![
            StageType::Scenario,
            StageType::DrivingQuestion,
            StageType::QuestionChain,
            StageType::Activity,
            StageType::Experiment,
        ]
    );
}

#[test]
fn missing_chain_skips_completed_stages() {
    let completed = [StageType::Scenario, StageType::DrivingQuestion];
    let chain = missing_chain(StageType::Activity, EntryPoint::Scenario, &completed).unwrap();
    assert_eq!(chain, vec![StageType::QuestionChain, StageType::Activity]);
}

#[test]
fn missing_chain_includes_satisfied_target_alone() {
    let completed = [
        StageType::ToolSeed,
        StageType::Scenario,
        StageType::DrivingQuestion,
        StageType::QuestionChain,
    ];
    let chain = missing_chain(StageType::Activity, EntryPoint::ToolSeed, &completed).unwrap();
    assert_eq!(chain, vec![StageType::Activity]);
}

#[test]
fn cycle_in_custom_tables_is_detected() {
    let tables = DependencyTables {
        stage_deps: vec![
            (StageType::Scenario, vec![StageType::Activity]),
            (StageType::Activity, vec![StageType::Scenario]),
        ],
        tool_seed_deps: Vec::new(),
    };
    let err = tables
        .missing_chain(StageType::Scenario, EntryPoint::Scenario, &[])
        .unwrap_err();
    assert_eq!(err, DependencyCycle);
}

#[test]
fn self_cycle_is_detected() {
    let tables = DependencyTables {
        stage_deps: vec![(StageType::Scenario, vec![StageType::Scenario])],
        tool_seed_deps: Vec::new(),
    };
    assert!(tables
        .missing_chain(StageType::Scenario, EntryPoint::Scenario, &[])
        .is_err());
}

#[test]
fn sequence_is_the_canonical_progression() {
    assert_eq!(STAGE_SEQUENCE[0], StageType::Scenario);
    assert_eq!(STAGE_SEQUENCE[4], StageType::Experiment);
}

proptest::proptest! {
    /// For any completed subset, the chain to Experiment is deduplicated,
    /// ordered so every prerequisite precedes its dependent, and never
    /// contains a completed stage.
    #[test]
    fn missing_chain_is_consistent(mask in proptest::collection::vec(proptest::bool::ANY, 5)) {
        let completed: Vec<StageType> = STAGE_SEQUENCE
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(s, _)| *s)
            .collect();
        let chain =
            missing_chain(StageType::Experiment, EntryPoint::Scenario, &completed).unwrap();

        for stage in &chain {
            proptest::prop_assert!(!completed.contains(stage));
        }
        let mut seen: Vec<StageType> = Vec::new();
        for stage in &chain {
            proptest::prop_assert!(!seen.contains(stage));
            for dep in required_deps(*stage, EntryPoint::Scenario) {
                proptest::prop_assert!(completed.contains(&dep) || seen.contains(&dep));
            }
            seen.push(*stage);
        }
        if !completed.contains(&StageType::Experiment) {
            proptest::prop_assert_eq!(chain.last(), Some(&StageType::Experiment));
        }
    }
}
