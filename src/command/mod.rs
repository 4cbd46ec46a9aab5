//! Natural-language command bridge.
//!
//! Turns a free-text instruction plus a summary of the current board into a
//! structured task draft via a text-generation call. The reply is parsed at
//! this boundary into typed records; a reply that is present but not in the
//! expected shape falls back to a deterministic heuristic draft, while a
//! failed generation call surfaces as a failed command and creates nothing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::{GenerateError, TextGenerator};
use crate::model::Priority;

/// Longest title the heuristic fallback will take verbatim from the command.
const TITLE_LIMIT: usize = 50;

const FALLBACK_DESCRIPTION: &str =
    "This task was created by AI based on your natural language command.";

/// Errors surfaced to the caller of the command channel.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The generation call itself failed; no task is created.
    #[error("text generation failed: {0}")]
    Generation(#[from] GenerateError),

    /// The reply arrived but was not in the documented shape, and the
    /// operation has no heuristic fallback.
    #[error("the generated reply was not in the expected shape")]
    MalformedReply,
}

/// Summary of the live board handed to the generation prompt.
#[derive(Debug, Clone, Default)]
pub struct BoardContext {
    /// Column names in display order.
    pub column_names: Vec<String>,
    /// Titles of all current tasks.
    pub task_titles: Vec<String>,
    /// One line per task with priority and lane, for the suggestions prompt.
    pub task_summaries: Vec<String>,
}

/// Structured task-creation request produced by the bridge (or by a direct
/// UI add). Ids and timestamps are assigned later, by the board store.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub tags: Vec<String>,
}

/// A workflow improvement proposed by the suggestions channel. Read-only:
/// suggestions never mutate board state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
    pub action: String,
    pub impact: Impact,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Workflow,
    Task,
    Optimization,
    Collaboration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// Bridge between free text and structured board operations.
pub struct CommandBridge {
    llm: Arc<dyn TextGenerator>,
    model: String,
}

impl CommandBridge {
    pub fn new(llm: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Interpret `command` as a task-creation request.
    pub async fn interpret(
        &self,
        command: &str,
        context: &BoardContext,
    ) -> Result<TaskDraft, CommandError> {
        let prompt = create_task_prompt(command, context);
        let text = self.llm.generate(&prompt, &self.model).await?;

        Ok(parse_draft(&text).unwrap_or_else(|| {
            tracing::debug!("Generated reply was not structured, using heuristic draft");
            heuristic_draft(command)
        }))
    }

    /// Ask for 3-4 workflow improvements for the current board.
    pub async fn suggest(&self, context: &BoardContext) -> Result<Vec<Suggestion>, CommandError> {
        let prompt = suggestions_prompt(context);
        let text = self.llm.generate(&prompt, &self.model).await?;

        serde_json::from_str(text.trim()).map_err(|_| CommandError::MalformedReply)
    }
}

fn create_task_prompt(command: &str, context: &BoardContext) -> String {
    format!(
        "Based on this command: \"{}\", generate a task with title and description.\n\
         Context: This is for a project management board with columns: {}.\n\
         Current tasks: {}.\n\n\
         Respond with JSON format: {{\"title\": \"...\", \"description\": \"...\", \
         \"priority\": \"low|medium|high\", \"tags\": [\"tag1\", \"tag2\"]}}",
        command,
        context.column_names.join(", "),
        context.task_titles.join(", "),
    )
}

fn suggestions_prompt(context: &BoardContext) -> String {
    format!(
        "Based on this project management board state, suggest 3-4 workflow improvements:\n\n\
         Columns: {}\n\
         Tasks: {}\n\n\
         Analyze the current workflow and suggest specific improvements like:\n\
         - Task organization optimizations\n\
         - Workflow bottlenecks to address\n\
         - Missing tasks that should be added\n\
         - Column rebalancing suggestions\n\n\
         Respond with JSON array format: [{{\"type\": \"workflow|task|optimization|collaboration\", \
         \"title\": \"...\", \"description\": \"...\", \"action\": \"...\", \
         \"impact\": \"low|medium|high\", \"confidence\": 0.85}}]",
        context.column_names.join(", "),
        context.task_summaries.join(", "),
    )
}

/// Expected reply shape for task creation. `priority` and `tags` may be
/// omitted; anything outside the shape fails the parse entirely.
#[derive(Debug, Deserialize)]
struct DraftReply {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

fn parse_draft(text: &str) -> Option<TaskDraft> {
    let reply: DraftReply = serde_json::from_str(text.trim()).ok()?;
    Some(TaskDraft {
        title: reply.title,
        description: reply.description,
        priority: reply.priority.unwrap_or_default(),
        tags: reply
            .tags
            .unwrap_or_else(|| vec!["ai-generated".to_string()]),
    })
}

/// Deterministic fallback when the reply is unstructured: the command itself
/// becomes the title, truncated with an ellipsis suffix when too long.
fn heuristic_draft(command: &str) -> TaskDraft {
    let title = if command.chars().count() > TITLE_LIMIT {
        let mut t: String = command.chars().take(TITLE_LIMIT).collect();
        t.push_str("...");
        t
    } else {
        command.to_string()
    };

    TaskDraft {
        title,
        description: Some(FALLBACK_DESCRIPTION.to_string()),
        priority: Priority::Medium,
        tags: vec!["ai-generated".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Generator that replies with a fixed payload, or fails.
    struct FakeGenerator {
        reply: Option<String>,
    }

    impl FakeGenerator {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: None })
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, GenerateError> {
            self.reply
                .clone()
                .ok_or_else(|| GenerateError::Network("connection refused".to_string()))
        }
    }

    fn bridge(llm: Arc<FakeGenerator>) -> CommandBridge {
        CommandBridge::new(llm, "openai/gpt-4o-mini")
    }

    #[test]
    fn test_well_formed_reply_becomes_draft() {
        let llm = FakeGenerator::replying(
            r#"{"title": "Fix login bug", "description": "Investigate OAuth flow",
                "priority": "high", "tags": ["bug", "auth"]}"#,
        );

        let draft = tokio_test::block_on(bridge(llm).interpret("fix login bug", &BoardContext::default()))
            .unwrap();

        assert_eq!(draft.title, "Fix login bug");
        assert_eq!(draft.description.as_deref(), Some("Investigate OAuth flow"));
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.tags, vec!["bug", "auth"]);
    }

    #[test]
    fn test_missing_priority_and_tags_default() {
        let llm = FakeGenerator::replying(r#"{"title": "Fix login bug"}"#);
        let draft = tokio_test::block_on(bridge(llm).interpret("fix login bug", &BoardContext::default()))
            .unwrap();

        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.tags, vec!["ai-generated"]);
    }

    #[test]
    fn test_prose_reply_falls_back_to_heuristic() {
        let llm = FakeGenerator::replying("Sure! I'd be happy to create that task for you.");
        let draft = tokio_test::block_on(bridge(llm).interpret("fix login bug", &BoardContext::default()))
            .unwrap();

        assert_eq!(draft.title, "fix login bug");
        assert_eq!(draft.description.as_deref(), Some(FALLBACK_DESCRIPTION));
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.tags, vec!["ai-generated"]);
    }

    #[test]
    fn test_out_of_range_priority_fails_the_shape() {
        let llm = FakeGenerator::replying(r#"{"title": "Fix login bug", "priority": "urgent"}"#);
        let draft = tokio_test::block_on(bridge(llm).interpret("fix login bug", &BoardContext::default()))
            .unwrap();

        // the whole reply is treated as unstructured
        assert_eq!(draft.tags, vec!["ai-generated"]);
        assert_eq!(draft.priority, Priority::Medium);
    }

    #[test]
    fn test_heuristic_title_truncates_past_fifty_chars() {
        let short = "a".repeat(50);
        let long = "b".repeat(51);

        let llm = FakeGenerator::replying("not json");
        let draft = tokio_test::block_on(bridge(Arc::clone(&llm)).interpret(&short, &BoardContext::default()))
            .unwrap();
        assert_eq!(draft.title, short);

        let draft = tokio_test::block_on(bridge(llm).interpret(&long, &BoardContext::default()))
            .unwrap();
        assert_eq!(draft.title.chars().count(), 53);
        assert!(draft.title.ends_with("..."));
        assert!(draft.title.starts_with("bbb"));
    }

    #[test]
    fn test_generation_failure_is_a_failed_command() {
        let llm = FakeGenerator::failing();
        let err = tokio_test::block_on(bridge(llm).interpret("fix login bug", &BoardContext::default()))
            .unwrap_err();

        assert!(matches!(err, CommandError::Generation(_)));
    }

    #[test]
    fn test_suggestions_parse_documented_shape() {
        let llm = FakeGenerator::replying(
            r#"[{"type": "workflow", "title": "Balance lanes",
                "description": "Review is overloaded", "action": "Move two tasks back",
                "impact": "medium", "confidence": 0.85}]"#,
        );

        let suggestions =
            tokio_test::block_on(bridge(llm).suggest(&BoardContext::default())).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::Workflow);
        assert_eq!(suggestions[0].impact, Impact::Medium);
    }

    #[test]
    fn test_suggestions_reject_prose_and_unknown_variants() {
        let prose = FakeGenerator::replying("Here are some ideas: ...");
        let err = tokio_test::block_on(bridge(prose).suggest(&BoardContext::default())).unwrap_err();
        assert!(matches!(err, CommandError::MalformedReply));

        let unknown = FakeGenerator::replying(
            r#"[{"type": "miracle", "title": "t", "description": "d",
                "action": "a", "impact": "high", "confidence": 1.0}]"#,
        );
        let err =
            tokio_test::block_on(bridge(unknown).suggest(&BoardContext::default())).unwrap_err();
        assert!(matches!(err, CommandError::MalformedReply));
    }
}
