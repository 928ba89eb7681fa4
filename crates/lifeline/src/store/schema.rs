//! `SQLite` schema definitions for the record store.
//!
//! Timestamps are RFC 3339 text in UTC with fixed microsecond precision, so
//! lexical order in SQL matches chronological order.

/// SQL statement to create the users table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the profiles table (one row per user).
pub const CREATE_PROFILES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    full_name TEXT NOT NULL DEFAULT '',
    blood_type TEXT,
    has_diabetes INTEGER NOT NULL DEFAULT 0,
    allergies TEXT NOT NULL DEFAULT '',
    medical_conditions TEXT NOT NULL DEFAULT '',
    medications TEXT NOT NULL DEFAULT '',
    emergency_notes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the contacts table.
///
/// `seq` records insertion order and breaks ordering ties.
pub const CREATE_CONTACTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS contacts (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    relationship TEXT NOT NULL,
    phone TEXT NOT NULL,
    is_primary INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Index matching the contact display order, added in schema version 2.
pub const CREATE_CONTACTS_ORDER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_contacts_display_order
ON contacts(user_id, is_primary DESC, created_at ASC, seq ASC)
";

/// Columns selected for a profile row, in `row_to_profile` order.
pub const PROFILE_COLUMNS: &str = "id, full_name, blood_type, has_diabetes, allergies, \
     medical_conditions, medications, emergency_notes, created_at, updated_at";

/// Columns selected for a contact row, in `row_to_contact` order.
pub const CONTACT_COLUMNS: &str = "id, user_id, name, relationship, phone, is_primary, created_at";

/// All base schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_PROFILES_TABLE,
    CREATE_CONTACTS_TABLE,
    CREATE_METADATA_TABLE,
];
