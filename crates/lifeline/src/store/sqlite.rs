//! `SQLite` implementation of the record store.
//!
//! Holds the users, profiles and contacts tables. Every read and write is
//! scoped by the owning user id, so one user can never see or change
//! another user's rows.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{BloodType, Contact, ContactForm, ContactId, Profile, ProfileForm, UserId};

use super::migrations;
use super::schema::{CONTACT_COLUMNS, PROFILE_COLUMNS};

/// Metadata key holding the signed-in user.
const SESSION_KEY: &str = "session_user";

/// Record store backed by a local `SQLite` database.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set how long writers wait on a locked database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection rejects the setting.
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn()?.busy_timeout(timeout)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("storage connection lock poisoned"))
    }

    // === Users ===

    /// Register a new user and provision their empty profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_user(&self) -> Result<UserId> {
        let user = UserId::new();
        let now = store_now();
        let profile = Profile::provisioned(user, now);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO users (id, created_at) VALUES (?1, ?2)",
            params![user.to_string(), encode_time(now)],
        )?;
        tx.execute(
            r"
            INSERT INTO profiles (id, full_name, has_diabetes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                user.to_string(),
                profile.full_name,
                profile.has_diabetes,
                encode_time(profile.created_at),
                encode_time(profile.updated_at),
            ],
        )?;
        tx.commit()?;

        info!(user = %user, "Provisioned user");
        Ok(user)
    }

    /// Check whether a user is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_exists(&self, user: UserId) -> Result<bool> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?1",
            [user.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // === Profiles ===

    /// Get the user's profile, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_profile(&self, user: UserId) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1");
        let profile = self
            .conn()?
            .query_row(&sql, [user.to_string()], row_to_profile)
            .optional()?;
        Ok(profile)
    }

    /// Overwrite the editable fields of the user's profile.
    ///
    /// `updated_at` is refreshed; `created_at` is left alone.
    ///
    /// # Errors
    ///
    /// Returns `ProfileNotFound` if the user has no profile row, or an error
    /// if the database operation fails.
    pub fn update_profile(&self, user: UserId, form: &ProfileForm) -> Result<Profile> {
        let now = store_now();
        let affected = self.conn()?.execute(
            r"
            UPDATE profiles SET
                full_name = ?2,
                blood_type = ?3,
                has_diabetes = ?4,
                allergies = ?5,
                medical_conditions = ?6,
                medications = ?7,
                emergency_notes = ?8,
                updated_at = ?9
            WHERE id = ?1
            ",
            params![
                user.to_string(),
                form.full_name,
                form.blood_type.map(|bt| bt.as_str()),
                form.has_diabetes,
                form.allergies,
                form.medical_conditions,
                form.medications,
                form.emergency_notes,
                encode_time(now),
            ],
        )?;

        if affected == 0 {
            return Err(Error::ProfileNotFound {
                user_id: user.to_string(),
            });
        }
        debug!(user = %user, "Updated profile");

        self.get_profile(user)?.ok_or_else(|| Error::ProfileNotFound {
            user_id: user.to_string(),
        })
    }

    // === Contacts ===

    /// List the user's contacts in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_contacts(&self, user: UserId) -> Result<Vec<Contact>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = ?1 \
             ORDER BY is_primary DESC, created_at ASC, seq ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let contacts = stmt
            .query_map([user.to_string()], row_to_contact)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    /// Get one of the user's contacts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_contact(&self, user: UserId, id: ContactId) -> Result<Option<Contact>> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND user_id = ?2");
        let contact = self
            .conn()?
            .query_row(&sql, [id.to_string(), user.to_string()], row_to_contact)
            .optional()?;
        Ok(contact)
    }

    /// Add a contact for the user.
    ///
    /// With `single_primary`, a new primary contact demotes the user's others.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_contact(
        &self,
        user: UserId,
        form: &ContactForm,
        single_primary: bool,
    ) -> Result<Contact> {
        let contact = Contact {
            id: ContactId::new(),
            user_id: user,
            name: form.name.clone(),
            relationship: form.relationship.clone(),
            phone: form.phone.clone(),
            is_primary: form.is_primary,
            created_at: store_now(),
        };

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        if single_primary && contact.is_primary {
            demote_primaries(&tx, user)?;
        }
        tx.execute(
            r"
            INSERT INTO contacts (id, user_id, name, relationship, phone, is_primary, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                contact.id.to_string(),
                user.to_string(),
                contact.name,
                contact.relationship,
                contact.phone,
                contact.is_primary,
                encode_time(contact.created_at),
            ],
        )?;
        tx.commit()?;

        debug!(user = %user, contact = %contact.id, "Inserted contact");
        Ok(contact)
    }

    /// Overwrite one of the user's contacts. `created_at` never changes.
    ///
    /// # Errors
    ///
    /// Returns `ContactNotFound` if the contact does not belong to the user,
    /// or an error if the database operation fails.
    pub fn update_contact(
        &self,
        user: UserId,
        id: ContactId,
        form: &ContactForm,
        single_primary: bool,
    ) -> Result<Contact> {
        {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;
            if single_primary && form.is_primary {
                demote_primaries(&tx, user)?;
            }
            let affected = tx.execute(
                r"
                UPDATE contacts SET name = ?3, relationship = ?4, phone = ?5, is_primary = ?6
                WHERE id = ?1 AND user_id = ?2
                ",
                params![
                    id.to_string(),
                    user.to_string(),
                    form.name,
                    form.relationship,
                    form.phone,
                    form.is_primary,
                ],
            )?;
            if affected == 0 {
                // Dropping the transaction rolls back any demotion.
                return Err(Error::ContactNotFound {
                    contact_id: id.to_string(),
                });
            }
            tx.commit()?;
        }

        debug!(user = %user, contact = %id, "Updated contact");
        self.get_contact(user, id)?
            .ok_or_else(|| Error::ContactNotFound {
                contact_id: id.to_string(),
            })
    }

    /// Delete one of the user's contacts.
    ///
    /// Returns `true` if a contact was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_contact(&self, user: UserId, id: ContactId) -> Result<bool> {
        let affected = self.conn()?.execute(
            "DELETE FROM contacts WHERE id = ?1 AND user_id = ?2",
            [id.to_string(), user.to_string()],
        )?;
        if affected > 0 {
            debug!(user = %user, contact = %id, "Deleted contact");
        }
        Ok(affected > 0)
    }

    // === Session ===

    /// Read the persisted signed-in user, if any.
    ///
    /// A stored value that is not a valid id is treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn load_session(&self) -> Result<Option<UserId>> {
        let value: Option<String> = self
            .conn()?
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                [SESSION_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value.and_then(|v| match UserId::from_str(&v) {
            Ok(user) => Some(user),
            Err(_) => {
                warn!("Ignoring malformed stored session: {}", v);
                None
            }
        }))
    }

    /// Persist the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_session(&self, user: UserId) -> Result<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![SESSION_KEY, user.to_string()],
        )?;
        Ok(())
    }

    /// Forget the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_session(&self) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM metadata WHERE key = ?1", [SESSION_KEY])?;
        Ok(())
    }

    // === Stats ===

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;
        let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let contacts: i64 =
            conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        drop(conn);

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            users,
            contacts,
            db_size_bytes,
        })
    }
}

/// Statistics about the record store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Registered users.
    pub users: i64,
    /// Contacts across all users.
    pub contacts: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

fn demote_primaries(conn: &Connection, user: UserId) -> Result<()> {
    let demoted = conn.execute(
        "UPDATE contacts SET is_primary = 0 WHERE user_id = ?1 AND is_primary = 1",
        [user.to_string()],
    )?;
    if demoted > 0 {
        debug!(user = %user, demoted, "Cleared previous primary contacts");
    }
    Ok(())
}

/// Current time at the precision the store keeps.
fn store_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_time(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn get_uuid(row: &Row, idx: usize) -> rusqlite::Result<uuid::Uuid> {
    let text: String = row.get(idx)?;
    uuid::Uuid::parse_str(&text).map_err(|e| conversion_error(idx, e))
}

/// Convert a database row to a Profile.
fn row_to_profile(row: &Row) -> rusqlite::Result<Profile> {
    let blood_type: Option<String> = row.get(2)?;
    let blood_type = blood_type.and_then(|s| match s.parse::<BloodType>() {
        Ok(bt) => Some(bt),
        Err(_) => {
            warn!("Unknown blood type {:?} in store, treating as absent", s);
            None
        }
    });

    Ok(Profile {
        id: UserId::from_uuid(get_uuid(row, 0)?),
        full_name: row.get(1)?,
        blood_type,
        has_diabetes: row.get(3)?,
        allergies: row.get(4)?,
        medical_conditions: row.get(5)?,
        medications: row.get(6)?,
        emergency_notes: row.get(7)?,
        created_at: get_time(row, 8)?,
        updated_at: get_time(row, 9)?,
    })
}

/// Convert a database row to a Contact.
fn row_to_contact(row: &Row) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: ContactId::from_uuid(get_uuid(row, 0)?),
        user_id: UserId::from_uuid(get_uuid(row, 1)?),
        name: row.get(2)?,
        relationship: row.get(3)?,
        phone: row.get(4)?,
        is_primary: row.get(5)?,
        created_at: get_time(row, 6)?,
    })
}
