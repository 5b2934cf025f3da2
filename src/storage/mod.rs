//! Thin wrapper around the embedded relational store.

pub mod schema;

use std::{
    fs,
    path::Path,
    sync::{
        mpsc::{channel, Receiver, Sender},
        Mutex,
    },
};

use rusqlite::Connection;

use crate::errors::{AppError, AppResult};

/// Coarse change notification, one variant per mutated table group.
///
/// Subscribers receive every event emitted after they attach; there is no
/// deduplication or backpressure. A receiver that goes out of scope is
/// pruned on the next emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Accounts,
    Categories,
    Transactions,
    Budgets,
    Debts,
    Habits,
    Labels,
    Settings,
}

/// Owns the sqlite connection and the change-event subscribers.
///
/// All repository operations borrow the database; writes are serialized by
/// sqlite's own transaction handling, matching the app's single-writer,
/// request/response call style.
pub struct Database {
    conn: Connection,
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies the schema.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|err| AppError::Database(format!("open {}: {}", path.display(), err)))?;
        Self::bootstrap(conn)
    }

    /// Opens the managed database under the application data directory.
    pub fn open_default() -> AppResult<Self> {
        Self::open(&crate::utils::database_file())
    }

    /// In-memory store, used by tests and previews.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(schema::SCHEMA)?;
        tracing::debug!("database schema applied");
        Ok(Self {
            conn,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Attaches a change listener. Dropping the receiver detaches it.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel();
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(tx);
        rx
    }

    /// Pushes a change event to every live subscriber.
    pub(crate) fn emit(&self, event: StoreEvent) {
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_creates_all_tables() {
        let db = Database::open_in_memory().expect("open in-memory store");
        let count: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN (
                    'accounts', 'categories', 'transactions', 'budgets', 'debts',
                    'debt_payments', 'habits', 'habit_logs', 'labels',
                    'transaction_labels', 'app_config')",
                [],
                |row| row.get(0),
            )
            .expect("count tables");
        assert_eq!(count, 11);
    }

    #[test]
    fn subscribers_receive_events_until_dropped() {
        let db = Database::open_in_memory().expect("open in-memory store");
        let rx = db.subscribe();
        db.emit(StoreEvent::Accounts);
        assert_eq!(rx.recv().ok(), Some(StoreEvent::Accounts));

        drop(rx);
        db.emit(StoreEvent::Budgets);
        let subscribers = db.subscribers.lock().unwrap();
        assert!(subscribers.is_empty(), "dropped receiver should be pruned");
    }

    #[test]
    fn open_persists_to_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("fintra.sqlite");
        {
            let db = Database::open(&path).expect("open on-disk store");
            db.conn()
                .execute(
                    "INSERT INTO app_config (key, value) VALUES ('probe', '1')",
                    [],
                )
                .expect("insert probe row");
        }
        let reopened = Database::open(&path).expect("reopen store");
        let value: String = reopened
            .conn()
            .query_row(
                "SELECT value FROM app_config WHERE key = 'probe'",
                [],
                |row| row.get(0),
            )
            .expect("read probe row");
        assert_eq!(value, "1");
    }
}
