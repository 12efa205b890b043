//! Intent dispatch
//!
//! Entry point for inbound messages. A pending confirmation is checked
//! before any new classification; otherwise the text is classified and
//! the resolved intent mapped onto task store operations. Every failure
//! along the way becomes a reply string: the transport never sees an
//! error from here.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::warn;

use crate::classifier::{
    render_system_prompt, Classifier, Command, Outcome, DEFAULT_PROMPT_TEMPLATE,
};
use crate::date::{self, InvalidDate, Resolved};
use crate::dialogue::{ChatId, PendingAction, Reply, SessionStore};
use crate::error::Error;
use crate::task::TaskStore;

pub struct Dispatcher {
    store: Arc<TaskStore>,
    sessions: Arc<dyn SessionStore>,
    classifier: Arc<dyn Classifier>,
    prompt_template: String,
}

impl Dispatcher {
    pub fn new(
        store: Arc<TaskStore>,
        sessions: Arc<dyn SessionStore>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            store,
            sessions,
            classifier,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Handle one inbound message using the system clock for "today".
    pub async fn handle_inbound(&self, chat: ChatId, text: &str) -> String {
        self.handle_inbound_at(chat, text, Local::now().date_naive())
            .await
    }

    /// Handle one inbound message with an explicit current date.
    pub async fn handle_inbound_at(&self, chat: ChatId, text: &str, today: NaiveDate) -> String {
        if let Some(pending) = self.sessions.get(chat).await {
            return self.handle_confirmation(chat, text, pending).await;
        }

        let context = render_system_prompt(&self.prompt_template, today);
        let reply = match self.classifier.classify(&context, text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Classifier failed: {}", e);
                return "Произошла ошибка при обращении к AI. Пожалуйста, попробуйте позже."
                    .to_string();
            }
        };

        match Outcome::from_reply(&reply) {
            Outcome::FreeText(text) => text,
            Outcome::Command(command) => self.dispatch(chat, command, today).await,
        }
    }

    async fn handle_confirmation(
        &self,
        chat: ChatId,
        text: &str,
        pending: PendingAction,
    ) -> String {
        match Reply::classify(text) {
            // Unrecognized replies re-prompt and keep the pending action
            Reply::Other => "Пожалуйста, ответьте 'да' или 'нет'.".to_string(),
            Reply::Negative => {
                self.sessions.clear(chat).await;
                match pending {
                    PendingAction::DeleteAll => {
                        "Отмена операции. Задачи не были удалены.".to_string()
                    }
                    PendingAction::DeleteSpecific { .. } => {
                        "Отмена операции. Ничего не было удалено.".to_string()
                    }
                }
            }
            Reply::Affirmative => {
                self.sessions.clear(chat).await;
                self.execute_pending(pending).await
            }
        }
    }

    async fn execute_pending(&self, pending: PendingAction) -> String {
        match pending {
            PendingAction::DeleteAll => match self.store.delete_all().await {
                Ok(()) => "Все задачи удалены.".to_string(),
                Err(e) => storage_failure(e),
            },
            PendingAction::DeleteSpecific { date, task_number } => {
                match self.store.delete(&date, task_number).await {
                    Ok(()) => match task_number {
                        Some(number) => format!("Задача №{} на {} удалена.", number, date),
                        None => format!("Все задачи на {} удалены.", date),
                    },
                    Err(Error::NotFound(_)) => format!("На {} задач нет.", date),
                    Err(Error::InvalidPosition { number, .. }) => {
                        format!("Задачи с номером {} на {} нет.", number, date)
                    }
                    Err(e) => storage_failure(e),
                }
            }
        }
    }

    async fn dispatch(&self, chat: ChatId, command: Command, today: NaiveDate) -> String {
        match command {
            Command::AddTask { date, task } => self.add_task(date, task, today).await,
            Command::ShowTasks { date } => self.show_tasks(date, today).await,
            Command::DeleteTasks { date, task_number } => {
                self.arm_delete(chat, date, task_number, today).await
            }
            Command::DeleteAllTasks => {
                self.sessions.set(chat, PendingAction::DeleteAll).await;
                "Вы уверены, что хотите удалить АБСОЛЮТНО все задачи? \
                 Это действие необратимо. (да/нет)"
                    .to_string()
            }
            Command::Unknown(name) => format!("Неизвестная команда от AI: {}", name),
        }
    }

    async fn add_task(
        &self,
        date: Option<String>,
        task: Option<String>,
        today: NaiveDate,
    ) -> String {
        let (Some(date), Some(task)) = (date, task) else {
            return "Не понял дату или текст задачи. Попробуйте уточнить.".to_string();
        };
        let date = match resolve_date(&date, today) {
            Ok(date) => date,
            Err(reply) => return reply,
        };
        match self.store.add_task(&date, &task).await {
            Ok(_) => format!("✅ Добавлено: [{}] — {}", date, task),
            Err(Error::InvalidInput(_)) => {
                "Не понял дату или текст задачи. Попробуйте уточнить.".to_string()
            }
            Err(e) => storage_failure(e),
        }
    }

    async fn show_tasks(&self, date: Option<String>, today: NaiveDate) -> String {
        let date = match date {
            Some(raw) => match resolve_date(&raw, today) {
                Ok(date) => Some(date),
                Err(reply) => return reply,
            },
            None => None,
        };
        self.store.list_tasks(date.as_deref(), today).await
    }

    /// Never deletes directly: arms the confirmation state and returns
    /// the question for the transport to deliver.
    async fn arm_delete(
        &self,
        chat: ChatId,
        date: Option<String>,
        task_number: Option<String>,
        today: NaiveDate,
    ) -> String {
        let Some(date) = date else {
            return "Не могу удалить, т.к. не понял дату. Попробуйте уточнить.".to_string();
        };
        let date = match resolve_date(&date, today) {
            Ok(date) => date,
            Err(reply) => return reply,
        };
        let task_number = match task_number {
            None => None,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(number) if number > 0 => Some(number),
                _ => {
                    return "Не понял номер задачи. Укажите его положительным числом.".to_string()
                }
            },
        };

        let question = match task_number {
            Some(number) => format!(
                "Вы уверены, что хотите удалить задачу №{} на {}? (да/нет)",
                number, date
            ),
            None => format!(
                "Вы уверены, что хотите удалить ВСЕ задачи на {}? (да/нет)",
                date
            ),
        };
        self.sessions
            .set(chat, PendingAction::DeleteSpecific { date, task_number })
            .await;
        question
    }
}

/// Resolve a date argument to its canonical `YYYY-MM-DD` form, or
/// produce the reply explaining why it cannot be used.
fn resolve_date(raw: &str, today: NaiveDate) -> std::result::Result<String, String> {
    match date::resolve(raw, today) {
        Resolved::Ok(date) => Ok(date.to_string()),
        Resolved::NextYear(date) => Err(format!(
            "Эта дата в прошлом. Вы имели в виду {}? Если да, отправьте её в формате ГГГГ-ММ-ДД.",
            date
        )),
        Resolved::Invalid(InvalidDate::Passed) => {
            Err("Вы указали уже прошедшую дату.".to_string())
        }
        Resolved::Invalid(InvalidDate::Format) => {
            Err("Неверный формат даты. Попробуйте еще раз.".to_string())
        }
    }
}

fn storage_failure(e: Error) -> String {
    warn!("Task store operation failed: {}", e);
    "Что-то пошло не так при обработке вашего запроса.".to_string()
}
