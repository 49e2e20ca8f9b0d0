// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-neutral facade: typed requests, action aliases, projections,
//! and the chat surface. HTTP framing stays outside this crate.

use crate::bus::Subscription;
use crate::chat::{ChatResolution, ChatSessionStore, EntryResolver};
use crate::dialogue::{CreativeDialogueManager, InteractionRouter};
use crate::error::OrchestratorError;
use crate::intake::Intake;
use crate::orchestrator::{ActionPayload, Orchestrator};
use pbl_core::{
    dry_run_next_steps, ActionType, Clock, DecisionResult, DialogueState, EntryDecision,
    EntryPoint, Message, StageArtifact, StageStatus, StageType, Task, TaskStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// `POST create_task` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub entry_point: EntryPoint,
    #[serde(default)]
    pub scenario: Option<Value>,
    #[serde(default)]
    pub tool_seed: Option<Value>,
}

impl CreateTaskRequest {
    /// Entry data for the orchestrator, normalized across the two entries.
    pub fn entry_data(&self) -> Result<Map<String, Value>, OrchestratorError> {
        match self.entry_point {
            EntryPoint::Scenario => {
                let mut data = Map::new();
                match &self.scenario {
                    Some(Value::String(text)) => {
                        data.insert("scenario".into(), Value::String(text.clone()));
                    }
                    Some(Value::Object(map)) => {
                        data = map.clone();
                    }
                    _ => return Err(OrchestratorError::validation("Missing scenario")),
                }
                Ok(data)
            }
            EntryPoint::ToolSeed => match &self.tool_seed {
                Some(Value::Object(map)) => Ok(map.clone()),
                _ => Err(OrchestratorError::validation("Missing tool_seed")),
            },
        }
    }
}

/// `POST task_action` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub payload: ActionPayload,
}

impl ActionRequest {
    /// Resolve the action name, honoring the short aliases.
    pub fn action_type(&self) -> Result<ActionType, OrchestratorError> {
        let normalized = self.action.trim().to_lowercase();
        let action = match normalized.as_str() {
            "accept" | "finalize_stage" => ActionType::FinalizeStage,
            "select" | "select_candidate" => ActionType::SelectCandidate,
            "regenerate" | "regenerate_candidates" => ActionType::RegenerateCandidates,
            "feedback" | "provide_feedback" => ActionType::ProvideFeedback,
            "resolve_conflict" => ActionType::ResolveConflict,
            _ => {
                return Err(OrchestratorError::validation(format!(
                    "Unknown action: {}",
                    self.action
                )))
            }
        };
        Ok(action)
    }
}

/// Standard task/decision/artifact response triple.
#[derive(Debug, Clone, Serialize)]
pub struct TaskEnvelope {
    pub task: Task,
    pub decision: DecisionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stage_artifact: Option<StageArtifact>,
}

/// `GET task_progress` projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskProgress {
    pub task_id: String,
    pub current_stage: StageType,
    pub completed_stages: Vec<StageType>,
    pub status: TaskStatus,
    pub stage_status: StageStatus,
}

pub fn task_progress(task: &Task) -> TaskProgress {
    TaskProgress {
        task_id: task.task_id.to_string(),
        current_stage: task.current_stage,
        completed_stages: task.completed_stages.clone(),
        status: task.status,
        stage_status: task.stage_status,
    }
}

/// Stage-keyed selected contents (the course plan view).
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoursePlan {
    pub scenario: String,
    pub driving_question: String,
    pub question_chain: Vec<String>,
    pub activity: String,
    pub experiment: String,
}

pub fn course_plan(task: &Task) -> CoursePlan {
    let text = |stage: StageType| {
        task.selected_candidate(stage).map(|c| c.content_text(stage.key())).unwrap_or_default()
    };
    CoursePlan {
        scenario: text(StageType::Scenario),
        driving_question: text(StageType::DrivingQuestion),
        question_chain: task.selected_question_chain(),
        activity: text(StageType::Activity),
        experiment: text(StageType::Experiment),
    }
}

/// `POST chat` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub intake: Option<Intake>,
}

/// `POST chat` response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    /// "ask" or "ready".
    pub status: String,
    pub assistant_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<EntryPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_decision: Option<EntryDecision>,
}

/// The callable surface handed to transport code.
pub struct Api {
    orchestrator: Arc<Orchestrator>,
    resolver: EntryResolver,
    sessions: ChatSessionStore,
    creative: CreativeDialogueManager,
    router: InteractionRouter,
}

impl Api {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let prompts = Arc::new(crate::generators::PromptLibrary::default());
        let resolver = EntryResolver::new(
            Arc::clone(orchestrator.lm()),
            Arc::clone(&prompts),
            orchestrator.config(),
        );
        let creative = CreativeDialogueManager::new(Arc::clone(orchestrator.lm()), prompts);
        Self {
            orchestrator,
            resolver,
            sessions: ChatSessionStore::new(),
            creative,
            router: InteractionRouter,
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
    ) -> Result<TaskEnvelope, OrchestratorError> {
        let entry_data = request.entry_data()?;
        let (task, decision, artifact) =
            self.orchestrator.create_task(request.entry_point, entry_data).await?;
        Ok(TaskEnvelope { task, decision, current_stage_artifact: artifact })
    }

    pub fn get_task(&self, task_id: &str) -> Result<Task, OrchestratorError> {
        self.orchestrator.get_task(task_id)
    }

    pub fn progress(&self, task_id: &str) -> Result<TaskProgress, OrchestratorError> {
        Ok(task_progress(&self.get_task(task_id)?))
    }

    pub fn plan(&self, task_id: &str) -> Result<CoursePlan, OrchestratorError> {
        Ok(course_plan(&self.get_task(task_id)?))
    }

    pub async fn task_action(
        &self,
        task_id: &str,
        request: ActionRequest,
    ) -> Result<TaskEnvelope, OrchestratorError> {
        let action_type = request.action_type()?;
        let (task, decision, artifact) =
            self.orchestrator.apply_action(task_id, action_type, request.payload).await?;
        Ok(TaskEnvelope { task, decision, current_stage_artifact: artifact })
    }

    /// Subscribe to a task's future events.
    pub fn subscribe(&self, task_id: &str) -> Result<Subscription, OrchestratorError> {
        let task = self.get_task(task_id)?;
        Ok(self.orchestrator.bus().subscribe(task.task_id))
    }

    /// The chat surface: entry resolution for new work, dialogue tracking
    /// for task-scoped messages.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, OrchestratorError> {
        let mut session = self.sessions.get_or_create(request.session_id.as_deref());
        session.append("user", request.message.clone());

        let response = if let Some(task_id) = &request.task_id {
            self.task_chat(&mut session, task_id, &request).await?
        } else {
            self.entry_chat(&mut session, &request).await?
        };
        self.sessions.save(session);
        Ok(response)
    }

    async fn entry_chat(
        &self,
        session: &mut crate::chat::ChatSession,
        request: &ChatRequest,
    ) -> Result<ChatResponse, OrchestratorError> {
        let history = session.transcript_tail(8);
        let resolution = self
            .resolver
            .resolve(
                &request.message,
                request.intake.as_ref(),
                session.last_intent.as_deref(),
                &history,
            )
            .await?;
        match resolution {
            ChatResolution::Ask { question } => {
                session.append("assistant", question.clone());
                Ok(ChatResponse {
                    session_id: session.session_id.to_string(),
                    status: "ask".into(),
                    assistant_message: question,
                    entry_point: None,
                    entry_data: None,
                    task_id: None,
                    entry_decision: None,
                })
            }
            ChatResolution::Ready { entry_point, entry_data, decision } => {
                let (task, ..) =
                    self.orchestrator.create_task(entry_point, entry_data.clone()).await?;
                let assistant_message = format!(
                    "Entry resolved as {entry_point}; the task has been created and the first \
                     stage is being prepared."
                );
                let message = Message::assistant(
                    assistant_message.clone(),
                    None,
                    self.orchestrator.clock().now_utc(),
                )
                .kind("entry_decision")
                .with_entry_decision(decision.clone());
                self.orchestrator.append_message(&task.task_id, message).await?;
                session.append("assistant", assistant_message.clone());
                session.last_intent = Some(request.message.clone());
                Ok(ChatResponse {
                    session_id: session.session_id.to_string(),
                    status: "ready".into(),
                    assistant_message,
                    entry_point: Some(entry_point),
                    entry_data: Some(entry_data),
                    task_id: Some(task.task_id.to_string()),
                    entry_decision: Some(decision),
                })
            }
        }
    }

    async fn task_chat(
        &self,
        session: &mut crate::chat::ChatSession,
        task_id: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, OrchestratorError> {
        let task = self.get_task(task_id)?;

        if let Some(intent) = CreativeDialogueManager::parse_intent_edit(&request.message) {
            self.orchestrator.update_intent(task_id, &intent, "explicit_edit", true).await?;
            let text = format!("Intent updated to: {intent}");
            self.orchestrator
                .append_message(
                    task_id,
                    Message::assistant(text.clone(), None, self.orchestrator.clock().now_utc()),
                )
                .await?;
            session.append("assistant", text.clone());
            return Ok(self.task_reply(session, task_id, "ready", text));
        }

        let recent: Vec<String> =
            task.messages.iter().rev().take(3).map(|m| m.text.clone()).rev().collect();
        let state = self.router.route(&request.message, &recent, task.dialogue_state);

        if state == DialogueState::Exploring {
            let extraction = self
                .creative
                .extract(
                    &task.creative_context,
                    &request.message,
                    request.intake.as_ref(),
                    &recent,
                )
                .await?;
            if extraction.needs_confirmation {
                let question = extraction
                    .question
                    .unwrap_or_else(|| "Could you say a bit more about the goal?".to_string());
                self.orchestrator
                    .append_message(
                        task_id,
                        Message::assistant(
                            question.clone(),
                            None,
                            self.orchestrator.clock().now_utc(),
                        )
                        .kind("clarification"),
                    )
                    .await?;
                session.append("assistant", question.clone());
                return Ok(self.task_reply(session, task_id, "ask", question));
            }
            self.orchestrator.update_creative_context(task_id, &extraction).await?;
            let text = if extraction.summary.is_empty() {
                "Noted; the creative context has been updated.".to_string()
            } else {
                format!("Noted: {}", extraction.summary)
            };
            self.orchestrator
                .append_message(
                    task_id,
                    Message::assistant(text.clone(), None, self.orchestrator.clock().now_utc()),
                )
                .await?;
            session.append("assistant", text.clone());
            return Ok(self.task_reply(session, task_id, "ready", text));
        }

        // Generating/selecting modes: report where the flow stands.
        let task = self.get_task(task_id)?;
        let decision = dry_run_next_steps(&task);
        let text = decision.user_message;
        session.append("assistant", text.clone());
        Ok(self.task_reply(session, task_id, "ready", text))
    }

    fn task_reply(
        &self,
        session: &crate::chat::ChatSession,
        task_id: &str,
        status: &str,
        assistant_message: String,
    ) -> ChatResponse {
        ChatResponse {
            session_id: session.session_id.to_string(),
            status: status.into(),
            assistant_message,
            entry_point: None,
            entry_data: None,
            task_id: Some(task_id.to_string()),
            entry_decision: None,
        }
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
