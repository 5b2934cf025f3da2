//! Embedded schema bootstrap, applied on every open.

/// Idempotent DDL for the whole store. Ids are uuid blobs, calendar dates
/// ISO-8601 text, audit timestamps RFC-3339 text, money REAL.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
  id              BLOB PRIMARY KEY,
  name            TEXT NOT NULL,
  kind            TEXT NOT NULL,
  currency        TEXT NOT NULL,
  opening_balance REAL NOT NULL DEFAULT 0,
  note            TEXT,
  is_archived     INTEGER NOT NULL DEFAULT 0,
  created_at      TEXT NOT NULL,
  updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
  id         BLOB PRIMARY KEY,
  name       TEXT NOT NULL,
  kind       TEXT NOT NULL,
  icon       TEXT NOT NULL,
  color      TEXT NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
  id          BLOB PRIMARY KEY,
  account_id  BLOB NOT NULL REFERENCES accounts(id),
  category_id BLOB NOT NULL REFERENCES categories(id),
  kind        TEXT NOT NULL,
  amount      REAL NOT NULL,
  date        TEXT NOT NULL,
  note        TEXT,
  created_at  TEXT NOT NULL,
  updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

CREATE TABLE IF NOT EXISTS budgets (
  id              BLOB PRIMARY KEY,
  name            TEXT NOT NULL,
  category_id     BLOB NOT NULL REFERENCES categories(id),
  amount          REAL NOT NULL,
  spent           REAL NOT NULL DEFAULT 0,
  period          TEXT NOT NULL,
  start_date      TEXT NOT NULL,
  end_date        TEXT,
  alert_threshold REAL NOT NULL,
  is_active       INTEGER NOT NULL DEFAULT 1,
  created_at      TEXT NOT NULL,
  updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS debts (
  id         BLOB PRIMARY KEY,
  name       TEXT NOT NULL,
  kind       TEXT NOT NULL,
  amount     REAL NOT NULL,
  note       TEXT,
  due_date   TEXT,
  is_settled INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS debt_payments (
  id      BLOB PRIMARY KEY,
  debt_id BLOB NOT NULL REFERENCES debts(id) ON DELETE CASCADE,
  amount  REAL NOT NULL,
  date    TEXT NOT NULL,
  note    TEXT
);

CREATE TABLE IF NOT EXISTS habits (
  id          BLOB PRIMARY KEY,
  name        TEXT NOT NULL,
  icon        TEXT NOT NULL,
  color       TEXT NOT NULL,
  xp_reward   INTEGER NOT NULL,
  is_archived INTEGER NOT NULL DEFAULT 0,
  created_at  TEXT NOT NULL,
  updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habit_logs (
  id       BLOB PRIMARY KEY,
  habit_id BLOB NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
  date     TEXT NOT NULL,
  UNIQUE(habit_id, date)
);
CREATE INDEX IF NOT EXISTS idx_habit_logs_date ON habit_logs(date);

CREATE TABLE IF NOT EXISTS labels (
  id         BLOB PRIMARY KEY,
  name       TEXT NOT NULL,
  color      TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transaction_labels (
  transaction_id BLOB NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
  label_id       BLOB NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
  PRIMARY KEY (transaction_id, label_id)
);

CREATE TABLE IF NOT EXISTS app_config (
  key   TEXT PRIMARY KEY,
  value TEXT NOT NULL
);
";
