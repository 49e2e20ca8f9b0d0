// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static per-stage prerequisites and the missing-chain topo sort.

use crate::types::{EntryPoint, StageType};
use thiserror::Error;

/// Canonical stage progression after entry.
pub const STAGE_SEQUENCE: [StageType; 5] = [
    StageType::Scenario,
    StageType::DrivingQuestion,
    StageType::QuestionChain,
    StageType::Activity,
    StageType::Experiment,
];

/// A revisit occurred during an in-progress depth-first walk.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Dependency cycle detected")]
pub struct DependencyCycle;

/// Prerequisite tables.
///
/// The default tables are the production graph; tests inject custom tables
/// to exercise the cycle path, which the static graph cannot reach.
#[derive(Debug, Clone)]
pub struct DependencyTables {
    pub stage_deps: Vec<(StageType, Vec<StageType>)>,
    /// Extra prerequisites prepended when the entry point is `tool_seed`.
    pub tool_seed_deps: Vec<(StageType, Vec<StageType>)>,
}

impl Default for DependencyTables {
    fn default() -> Self {
        Self {
            stage_deps: vec![
                (StageType::DrivingQuestion, vec![StageType::Scenario]),
                (StageType::QuestionChain, vec![StageType::DrivingQuestion]),
                (StageType::Activity, vec![StageType::QuestionChain]),
                (StageType::Experiment, vec![StageType::Activity]),
            ],
            tool_seed_deps: vec![
                (StageType::Scenario, vec![StageType::ToolSeed]),
                (StageType::Activity, vec![StageType::ToolSeed]),
            ],
        }
    }
}

impl DependencyTables {
    /// Ordered, de-duplicated prerequisite list for a stage.
    pub fn required_deps(&self, stage: StageType, entry_point: EntryPoint) -> Vec<StageType> {
        let mut deps: Vec<StageType> = Vec::new();
        if entry_point == EntryPoint::ToolSeed {
            if let Some((_, extra)) = self.tool_seed_deps.iter().find(|(s, _)| *s == stage) {
                deps.extend(extra.iter().copied());
            }
        }
        if let Some((_, base)) = self.stage_deps.iter().find(|(s, _)| *s == stage) {
            deps.extend(base.iter().copied());
        }
        let mut ordered = Vec::new();
        for dep in deps {
            if !ordered.contains(&dep) {
                ordered.push(dep);
            }
        }
        ordered
    }

    /// Depth-first topological order of every not-yet-completed stage needed
    /// to reach `target`, including `target` itself.
    pub fn missing_chain(
        &self,
        target: StageType,
        entry_point: EntryPoint,
        completed: &[StageType],
    ) -> Result<Vec<StageType>, DependencyCycle> {
        let mut chain = Vec::new();
        let mut visited = Vec::new();
        let mut visiting = Vec::new();
        self.visit(target, entry_point, completed, &mut chain, &mut visited, &mut visiting)?;
        Ok(chain)
    }

    fn visit(
        &self,
        stage: StageType,
        entry_point: EntryPoint,
        completed: &[StageType],
        chain: &mut Vec<StageType>,
        visited: &mut Vec<StageType>,
        visiting: &mut Vec<StageType>,
    ) -> Result<(), DependencyCycle> {
        if visiting.contains(&stage) {
            return Err(DependencyCycle);
        }
        if visited.contains(&stage) {
            return Ok(());
        }
        visiting.push(stage);
        visited.push(stage);
        for dep in self.required_deps(stage, entry_point) {
            if !completed.contains(&dep) {
                self.visit(dep, entry_point, completed, chain, visited, visiting)?;
            }
        }
        visiting.retain(|s| *s != stage);
        if !completed.contains(&stage) && !chain.contains(&stage) {
            chain.push(stage);
        }
        Ok(())
    }
}

/// [`DependencyTables::required_deps`] on the production graph.
pub fn required_deps(stage: StageType, entry_point: EntryPoint) -> Vec<StageType> {
    DependencyTables::default().required_deps(stage, entry_point)
}

/// [`DependencyTables::missing_chain`] on the production graph.
pub fn missing_chain(
    target: StageType,
    entry_point: EntryPoint,
    completed: &[StageType],
) -> Result<Vec<StageType>, DependencyCycle> {
    DependencyTables::default().missing_chain(target, entry_point, completed)
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
