//! File-backed task store
//!
//! Stores the task book as pretty-printed JSON in a single file. Every
//! mutation rewrites the whole file through a temp-file rename, so a
//! crash mid-write never leaves a half-written file behind. There is no
//! cross-process locking: concurrent writers race with last-write-wins,
//! a known limitation of the single-user design.

use std::path::PathBuf;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::model::TaskBook;
use crate::error::Error;
use crate::Result;

pub struct TaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory book, source of truth between persists
    book: RwLock<TaskBook>,
}

impl TaskStore {
    /// Open a store backed by `path`.
    ///
    /// A missing file means an empty book; an unreadable or unparsable
    /// file degrades to an empty book with a warning instead of failing
    /// the caller. Buckets dated strictly before `today` are pruned, and
    /// the pruned book is persisted if pruning changed anything.
    pub async fn open(path: impl Into<PathBuf>, today: NaiveDate) -> Result<Self> {
        let path = path.into();
        let mut book = if path.exists() {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<TaskBook>(&content) {
                    Ok(book) => book,
                    Err(e) => {
                        warn!(
                            "Task file {} is not valid JSON, starting empty: {}",
                            path.display(),
                            e
                        );
                        TaskBook::default()
                    }
                },
                Err(e) => {
                    warn!(
                        "Failed to read task file {}, starting empty: {}",
                        path.display(),
                        e
                    );
                    TaskBook::default()
                }
            }
        } else {
            TaskBook::default()
        };

        let pruned = book.prune_before(today);
        let store = Self {
            path,
            book: RwLock::new(book),
        };
        if pruned {
            debug!("Pruned past-dated buckets from {}", store.path.display());
            store.persist().await?;
        }
        Ok(store)
    }

    /// Append a task to the bucket for `date`. Returns the task's
    /// 1-based position within the bucket.
    pub async fn add_task(&self, date: &str, text: &str) -> Result<usize> {
        let date = date.trim();
        let text = text.trim();
        if date.is_empty() {
            return Err(Error::InvalidInput("task date is missing".to_string()));
        }
        if text.is_empty() {
            return Err(Error::InvalidInput("task text is missing".to_string()));
        }

        let position = {
            let mut book = self.book.write().await;
            book.add(date, text)
        };
        self.persist().await?;
        Ok(position)
    }

    /// Render the listing for one date, or the full listing.
    pub async fn list_tasks(&self, date: Option<&str>, today: NaiveDate) -> String {
        self.book.read().await.render(date, today)
    }

    /// The tasks scheduled for `date`, if any.
    pub async fn tasks_on(&self, date: &str) -> Option<Vec<String>> {
        self.book
            .read()
            .await
            .tasks_on(date)
            .map(|tasks| tasks.to_vec())
    }

    /// Wipe the whole book.
    pub async fn delete_all(&self) -> Result<()> {
        self.book.write().await.clear();
        self.persist().await
    }

    /// Delete the whole bucket for `date`, or the task at 1-based
    /// `task_number` within it.
    pub async fn delete(&self, date: &str, task_number: Option<usize>) -> Result<()> {
        {
            let mut book = self.book.write().await;
            let Some(len) = book.bucket_len(date) else {
                return Err(Error::NotFound(date.to_string()));
            };
            match task_number {
                None => {
                    book.remove_bucket(date);
                }
                Some(number) => {
                    if number == 0 || number > len {
                        return Err(Error::InvalidPosition {
                            date: date.to_string(),
                            number,
                        });
                    }
                    book.remove_at(date, number);
                }
            }
        }
        self.persist().await
    }

    /// Persist the book to disk: serialize, write to a temp file next to
    /// the target, then rename over it.
    async fn persist(&self) -> Result<()> {
        let content = {
            let book = self.book.read().await;
            serde_json::to_string_pretty(&*book)?
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write task file: {}", e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to replace task file: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(2024, 6, 15)
    }

    async fn create_test_store() -> (TaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = TaskStore::open(&path, today()).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let (store, _temp) = create_test_store().await;
        assert_eq!(store.list_tasks(None, today()).await, "Список задач пуст.");
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let (store, _temp) = create_test_store().await;

        assert_eq!(store.add_task("2099-01-01", "buy milk").await.unwrap(), 1);
        assert_eq!(store.add_task("2099-01-01", "call mom").await.unwrap(), 2);

        let listing = store.list_tasks(Some("2099-01-01"), today()).await;
        assert_eq!(listing, "Задачи на 2099-01-01:\n1. buy milk\n2. call mom");
    }

    #[tokio::test]
    async fn test_add_rejects_empty_input() {
        let (store, _temp) = create_test_store().await;

        assert!(matches!(
            store.add_task("", "task").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.add_task("2099-01-01", "   ").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_open_prunes_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        tokio::fs::write(
            &path,
            r#"{"2024-06-10": ["stale"], "2024-06-20": ["keep"]}"#,
        )
        .await
        .unwrap();

        let store = TaskStore::open(&path, today()).await.unwrap();
        assert!(store.tasks_on("2024-06-10").await.is_none());
        assert_eq!(store.tasks_on("2024-06-20").await.unwrap(), ["keep"]);

        // The pruned result was written back
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(!content.contains("2024-06-10"));
        assert!(content.contains("2024-06-20"));
    }

    #[tokio::test]
    async fn test_open_corrupt_file_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        tokio::fs::write(&path, "{ definitely not json").await.unwrap();

        let store = TaskStore::open(&path, today()).await.unwrap();
        assert_eq!(store.list_tasks(None, today()).await, "Список задач пуст.");

        // The store is usable again after the fallback
        store.add_task("2099-01-01", "fresh start").await.unwrap();
        assert_eq!(store.tasks_on("2099-01-01").await.unwrap(), ["fresh start"]);
    }

    #[tokio::test]
    async fn test_delete_task_by_number() {
        let (store, _temp) = create_test_store().await;
        store.add_task("2099-01-01", "first").await.unwrap();
        store.add_task("2099-01-01", "second").await.unwrap();

        store.delete("2099-01-01", Some(2)).await.unwrap();
        assert_eq!(store.tasks_on("2099-01-01").await.unwrap(), ["first"]);

        // Deleting the last task removes the bucket entirely
        store.delete("2099-01-01", Some(1)).await.unwrap();
        assert_eq!(
            store.list_tasks(Some("2099-01-01"), today()).await,
            "На 2099-01-01 задач нет."
        );
    }

    #[tokio::test]
    async fn test_delete_whole_bucket() {
        let (store, _temp) = create_test_store().await;
        store.add_task("2099-01-01", "first").await.unwrap();
        store.add_task("2099-01-01", "second").await.unwrap();

        store.delete("2099-01-01", None).await.unwrap();
        assert!(store.tasks_on("2099-01-01").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_errors() {
        let (store, _temp) = create_test_store().await;
        store.add_task("2099-01-01", "only").await.unwrap();

        assert!(matches!(
            store.delete("2099-02-02", None).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete("2099-01-01", Some(5)).await,
            Err(Error::InvalidPosition { number: 5, .. })
        ));
        // Failed deletes leave the bucket untouched
        assert_eq!(store.tasks_on("2099-01-01").await.unwrap(), ["only"]);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let (store, _temp) = create_test_store().await;
        store.add_task("2099-01-01", "a").await.unwrap();
        store.add_task("2099-02-02", "b").await.unwrap();

        store.delete_all().await.unwrap();
        assert_eq!(store.list_tasks(None, today()).await, "Список задач пуст.");
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        {
            let store = TaskStore::open(&path, today()).await.unwrap();
            store.add_task("2099-01-01", "купить молоко").await.unwrap();
        }

        {
            let store = TaskStore::open(&path, today()).await.unwrap();
            // Non-ASCII text survives the round trip exactly
            assert_eq!(
                store.tasks_on("2099-01-01").await.unwrap(),
                ["купить молоко"]
            );
        }
    }

    #[tokio::test]
    async fn test_save_load_fixed_point() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        {
            let store = TaskStore::open(&path, today()).await.unwrap();
            store.add_task("2099-01-01", "stable").await.unwrap();
        }
        let first = tokio::fs::read_to_string(&path).await.unwrap();

        // Re-opening with nothing to prune must not rewrite the file
        let store = TaskStore::open(&path, today()).await.unwrap();
        store.delete_all().await.unwrap();
        store.add_task("2099-01-01", "stable").await.unwrap();
        let second = tokio::fs::read_to_string(&path).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        let store = TaskStore::open(&path, today()).await.unwrap();
        store.add_task("2099-01-01", "task").await.unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("tasks.json.tmp").exists());
    }
}
