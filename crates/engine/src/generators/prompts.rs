// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt templates, kept out of the core logic and injected into the
//! generators so tests can substitute their own wording.

/// Simple `{name}` placeholder substitution.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// The prompt set used by the stage generators and chat services.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    pub scenario: String,
    pub driving_question: String,
    pub question_chain: String,
    pub activity: String,
    pub experiment: String,
    pub decision_message: String,
    pub entry_classifier: String,
    pub tool_seed_extract: String,
    pub starter_scenario: String,
    pub creative_intent: String,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self {
            scenario: SCENARIO.to_string(),
            driving_question: DRIVING_QUESTION.to_string(),
            question_chain: QUESTION_CHAIN.to_string(),
            activity: ACTIVITY.to_string(),
            experiment: EXPERIMENT.to_string(),
            decision_message: DECISION_MESSAGE.to_string(),
            entry_classifier: ENTRY_CLASSIFIER.to_string(),
            tool_seed_extract: TOOL_SEED_EXTRACT.to_string(),
            starter_scenario: STARTER_SCENARIO.to_string(),
            creative_intent: CREATIVE_INTENT.to_string(),
        }
    }
}

const OPTIONS_FORMAT: &str = r#"Output strict JSON only, no prose:
{"options": [{"title": "...", "{stage_key}": ..., "rationale": "...", "alignment_score": 0.0}]}
Produce exactly {count} options, each with a clearly different angle."#;

const SCENARIO: &str = r#"You design realistic project-based learning scenarios for classrooms.
Topic: {topic}
Grade: {grade_level}
Duration: {duration} minutes
Context: {context_summary}
{extras}
User feedback: {feedback}
Each option's "scenario" is a short grounded classroom scenario (a real task students could actually do). No fantasy, no sci-fi.
{format}"#;

const DRIVING_QUESTION: &str = r#"You write driving questions for project-based learning.
Scenario: {scenario}
Grade: {grade_level}
Context: {context_summary}
{extras}
User feedback: {feedback}
Each option's "driving_question" is one open question driving the whole project, plus a "question_chain" of exactly three sub-questions.
{format}"#;

const QUESTION_CHAIN: &str = r#"You decompose driving questions into sub-question chains.
Driving question: {driving_question}
Grade: {grade_level}
Context: {context_summary}
{extras}
User feedback: {feedback}
Each option's "question_chain" is a list of exactly three sub-questions that scaffold the driving question in order.
{format}"#;

const ACTIVITY: &str = r#"You design classroom activities that answer a question chain with a specific tool.
Topic: {topic}
Question chain: {question_chain}
Tool: {tool_name}
Tool constraints: {tool_constraints}
Duration: {duration} minutes
{extras}
User feedback: {feedback}
Each option's "activity" is a step-by-step activity plan that names the topic, walks the three sub-questions in order, and respects the tool constraints.
{format}"#;

const EXPERIMENT: &str = r#"You design hands-on experiments that extend a classroom activity.
Activity: {activity}
Topic: {topic}
Duration: {duration} minutes
{extras}
User feedback: {feedback}
Each option's "experiment" is a concrete experiment with materials, procedure, and an observable outcome.
{format}"#;

const DECISION_MESSAGE: &str = r#"You are a project-based learning co-creator assistant. Reply in short, natural language (2-4 sentences).
Must include: (1) the current stage and the next step.
(2) If direction is backward_completion or force_exit, tell the user plainly what to do.
(3) If candidates exist, guess the user's preferred style and offer alternatives.

Decision:
direction: {direction}
next_stage: {next_stage}
user_message: {user_message}
summary: {summary}

Classroom:
grade: {grade}
classroom: {classroom}

stage: {stage}
candidates:
{candidates}

conflicts:
{conflicts}"#;

const ENTRY_CLASSIFIER: &str = r#"You classify how a course-design task should start.
Output strict JSON only:
{"entry_point": "scenario" | "tool_seed", "confidence": 0.0, "reason": "..."}
Conversation so far:
{history}
User utterance: {text}"#;

const TOOL_SEED_EXTRACT: &str = r#"Extract a tool seed from the user's utterance.
Output strict JSON only:
{"tool_name": "...", "algorithms": [], "affordances": [], "constraints": {}, "user_intent": "..."}
Leave unknown fields empty rather than inventing them.
Utterance: {text}
Intake: {intake}"#;

const STARTER_SCENARIO: &str = r#"Write one short, realistic classroom scenario (3-5 sentences) to start a project-based learning task.
Topic: {topic}
Grade: {grade_level}
Utterance: {text}
Plain text only. Grounded in everyday school or community life; no fantasy."#;

const CREATIVE_INTENT: &str = r#"You distill creative intent from a course-design conversation.
Output strict JSON only:
{"intent": "...", "key_constraints": [], "anchor_concepts": [], "needs_confirmation": false, "question": null, "summary": "..."}
Rules:
- If the intent is vague, set needs_confirmation true and ask one clarifying question.
- Keep key_constraints to the 3-5 most important items.
- Never invent information that is not present.
Existing intent: {intent}
Existing constraints: {constraints}
Anchor concepts: {anchors}
Intake: {intake}
Recent messages: {recent}
User input: {text}"#;

impl PromptLibrary {
    /// The shared strict-JSON output contract for option batches.
    pub fn options_format(stage_key: &str, count: usize) -> String {
        render(OPTIONS_FORMAT, &[("stage_key", stage_key), ("count", &count.to_string())])
    }
}
