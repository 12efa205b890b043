//! Intent classification
//!
//! The hosted model is a black box: text in, raw reply out. A reply is
//! either a JSON tool call, parsed here into a closed [`Command`] set,
//! or plain prose that the dispatcher passes through as a ready
//! conversational answer.

mod openrouter;

pub use openrouter::{OpenRouterClassifier, OpenRouterConfig};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::Result;

/// Default system prompt template for the intent model. The date
/// placeholders are filled in by [`render_system_prompt`] on every call.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
Ты ассистент для управления списком задач. Сегодня {current_date}, \
завтра {current_date_tomorrow}, послезавтра {day_after_tomorrow_date}.
Если пользователь хочет выполнить действие со списком задач, ответь \
ТОЛЬКО JSON-объектом вида {\"tool_call\": \"<команда>\", \"arguments\": {...}} \
без пояснений.
Команды:
- add_task: arguments date (формат YYYY-MM-DD) и task (текст задачи);
- show_tasks: argument date (необязательный);
- delete_tasks: arguments date и task_number (необязательный);
- delete_all_tasks: без arguments.
На любые другие сообщения отвечай обычным текстом.";

/// Source of resolved intents.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Ask the model to interpret `user_text` under `system_context`.
    /// Returns the raw model reply: tool-call JSON or prose.
    async fn classify(&self, system_context: &str, user_text: &str) -> Result<String>;
}

/// One structured command the model can emit.
///
/// Arguments stay optional strings here; validation and date resolution
/// happen in the dispatcher, which turns missing pieces into
/// clarification replies instead of errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddTask {
        date: Option<String>,
        task: Option<String>,
    },
    ShowTasks {
        date: Option<String>,
    },
    DeleteTasks {
        date: Option<String>,
        task_number: Option<String>,
    },
    DeleteAllTasks,
    Unknown(String),
}

/// Parsed classifier reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Command(Command),
    FreeText(String),
}

#[derive(Deserialize)]
struct ToolCall {
    tool_call: String,
    #[serde(default)]
    arguments: Value,
}

impl Outcome {
    /// Interpret a raw model reply. Anything that is not a well-formed
    /// tool-call object passes through as free text verbatim.
    pub fn from_reply(raw: &str) -> Self {
        let raw = raw.trim();
        let Ok(call) = serde_json::from_str::<ToolCall>(raw) else {
            return Outcome::FreeText(raw.to_string());
        };

        let args = &call.arguments;
        let command = match call.tool_call.as_str() {
            "add_task" => Command::AddTask {
                date: string_arg(args, "date"),
                task: string_arg(args, "task"),
            },
            "show_tasks" => Command::ShowTasks {
                date: string_arg(args, "date"),
            },
            "delete_tasks" => Command::DeleteTasks {
                date: string_arg(args, "date"),
                task_number: string_arg(args, "task_number"),
            },
            "delete_all_tasks" => Command::DeleteAllTasks,
            other => Command::Unknown(other.to_string()),
        };
        Outcome::Command(command)
    }
}

/// Fetch an argument the model may emit as a string or a bare number.
fn string_arg(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Substitute the date placeholders the prompt template uses.
pub fn render_system_prompt(template: &str, today: NaiveDate) -> String {
    template
        .replace("{current_date}", &today.to_string())
        .replace(
            "{current_date_tomorrow}",
            &(today + Duration::days(1)).to_string(),
        )
        .replace(
            "{day_after_tomorrow_date}",
            &(today + Duration::days(2)).to_string(),
        )
}
