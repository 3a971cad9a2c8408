//! SQLite schema definition.

/// Complete database schema for saved prescriptions.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Medicines
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicines (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    dosage TEXT NOT NULL DEFAULT '[]',            -- JSON array of strings
    timing TEXT NOT NULL DEFAULT '[]',            -- JSON array of strings
    duration TEXT NOT NULL DEFAULT '[]',          -- JSON array of strings
    food_instruction TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    total_quantity INTEGER NOT NULL DEFAULT 0,
    refill_due_date TEXT,                         -- YYYY-MM-DD
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medicines_name ON medicines(name);

-- ============================================================================
-- Reminders
-- ============================================================================

CREATE TABLE IF NOT EXISTS reminders (
    id TEXT PRIMARY KEY,
    medicine_id TEXT NOT NULL REFERENCES medicines(id) ON DELETE CASCADE,
    datetime TEXT NOT NULL,                       -- YYYY-MM-DD HH:MM
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'taken', 'skipped')),
    instruction TEXT,
    dosage TEXT
);

CREATE INDEX IF NOT EXISTS idx_reminders_medicine ON reminders(medicine_id);
CREATE INDEX IF NOT EXISTS idx_reminders_due ON reminders(status, datetime);
"#;
