// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core types and pure logic for the course co-design task engine.
//!
//! Everything here is deterministic and IO-free: the data model, the
//! dependency graph, the stage state machine, the event envelope, and the
//! reducer that is the only legitimate mutator of a [`Task`].

pub mod artifact;
pub mod candidate;
pub mod clock;
pub mod conflict;
pub mod creative;
pub mod decision;
pub mod decision_engine;
pub mod deps;
pub mod event;
pub mod id;
mod macros;
pub mod message;
pub mod reducer;
pub mod seed;
pub mod state_machine;
pub mod task;
pub mod types;

pub use artifact::{RevisionId, RevisionSnapshot, StageArtifact};
pub use candidate::{value_to_text, Candidate, GenerationContext};
pub use clock::{Clock, FakeClock, SystemClock};
pub use conflict::{Conflict, ConflictId, ConflictOption};
pub use creative::{CreativeContext, IntentRevision, WorkingMemory, MAX_WORKING_NOTES};
pub use decision::{DecisionRecord, DecisionRecordKind, DecisionResult, Direction, Explanation};
pub use decision_engine::{dry_run_next_steps, make_decision, next_required_stage};
pub use deps::{missing_chain, required_deps, DependencyCycle, DependencyTables, STAGE_SEQUENCE};
pub use event::{Event, EventId, EventPayload, TraceContext};
pub use message::{EntryDecision, Message};
pub use reducer::{apply_event, replay};
pub use seed::{ConstraintMap, InvalidToolSeed, ToolSeed};
pub use state_machine::{
    allowed_actions, can_apply_action, should_force_exit, MAX_ITERATIONS,
};
pub use task::{PendingCascade, SessionId, Task, TaskId};
pub use types::{
    ActionType, CandidateStatus, ConflictSeverity, DialogueState, EntryPoint, StageStatus,
    StageType, TaskStatus,
};
