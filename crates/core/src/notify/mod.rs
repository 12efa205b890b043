//! Daily task digest
//!
//! The external scheduler polls [`DailyDigest::check`] at its own
//! cadence; the digest fires at most once per calendar day, and only
//! when something is scheduled for today.

use chrono::NaiveDate;
use tracing::debug;

use crate::task::TaskStore;

#[derive(Debug, Default)]
pub struct DailyDigest {
    last_sent: Option<NaiveDate>,
}

impl DailyDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the morning digest for `today`, or `None` when it already
    /// fired today or today's bucket is empty.
    pub async fn check(&mut self, store: &TaskStore, today: NaiveDate) -> Option<String> {
        if self.last_sent == Some(today) {
            return None;
        }
        let tasks = store.tasks_on(&today.to_string()).await?;

        let mut message = String::from("Доброе утро! ☀️ На сегодня у вас есть задачи:\n\n");
        for (i, task) in tasks.iter().enumerate() {
            message.push_str(&format!("{}. {}\n", i + 1, task));
        }

        self.last_sent = Some(today);
        debug!("Daily digest prepared for {}", today);
        Some(message)
    }
}
