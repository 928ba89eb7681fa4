//! Loads a user's profile and contacts into one view model.
//!
//! Both reads are issued together and joined with settle-all semantics: a
//! failure in one never cancels or hides the result of the other.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{sort_contacts, Contact, Profile, UserId};
use crate::store::RecordStore;

/// What the dashboard renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    /// The user's profile, if they have one.
    pub profile: Option<Profile>,
    /// The user's contacts in display order.
    pub contacts: Vec<Contact>,
}

impl ViewModel {
    /// Fold a fetch result into this view model.
    ///
    /// A successful read replaces its field. A failed read leaves its field
    /// as it was and is reported in the returned diagnostics.
    pub fn merge(&mut self, fetched: Fetched) -> Vec<LoadDiagnostic> {
        let mut diagnostics = Vec::new();

        match fetched.profile {
            Ok(profile) => self.profile = profile,
            Err(err) => diagnostics.push(LoadDiagnostic::new(RecordKind::Profile, &err)),
        }
        match fetched.contacts {
            Ok(contacts) => self.contacts = contacts,
            Err(err) => diagnostics.push(LoadDiagnostic::new(RecordKind::Contacts, &err)),
        }

        diagnostics
    }
}

/// Which of the two reads a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// The profile read.
    Profile,
    /// The contacts read.
    Contacts,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile => write!(f, "profile"),
            Self::Contacts => write!(f, "contacts"),
        }
    }
}

/// A read that failed during a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadDiagnostic {
    /// The read that failed.
    pub record: RecordKind,
    /// The error, as text.
    pub message: String,
}

impl LoadDiagnostic {
    fn new(record: RecordKind, err: &crate::Error) -> Self {
        Self {
            record,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load {}: {}", self.record, self.message)
    }
}

/// The settled outcome of both reads.
#[derive(Debug)]
pub struct Fetched {
    /// Result of the profile read.
    pub profile: Result<Option<Profile>>,
    /// Result of the contacts read, already in display order.
    pub contacts: Result<Vec<Contact>>,
}

impl Fetched {
    /// The outcome for a signed-out caller: nothing, and nothing failed.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            profile: Ok(None),
            contacts: Ok(Vec::new()),
        }
    }
}

/// Loads view models from a record store.
#[derive(Debug)]
pub struct Aggregator<S> {
    store: S,
}

impl<S: RecordStore> Aggregator<S> {
    /// Create an aggregator over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run both reads for `user` and wait until both have settled.
    ///
    /// With no user, returns [`Fetched::empty`] without touching the store.
    pub async fn fetch(&self, user: Option<UserId>) -> Fetched {
        let Some(user) = user else {
            debug!("No signed-in user, skipping load");
            return Fetched::empty();
        };

        debug!(user = %user, "Loading profile and contacts");
        let (profile, contacts) = tokio::join!(
            self.store.read_profile(user),
            self.store.read_contacts(user)
        );

        if let Err(err) = &profile {
            warn!(user = %user, error = %err, "Failed to load profile");
        }
        let contacts = match contacts {
            Ok(mut contacts) => {
                sort_contacts(&mut contacts);
                Ok(contacts)
            }
            Err(err) => {
                warn!(user = %user, error = %err, "Failed to load contacts");
                Err(err)
            }
        };

        Fetched { profile, contacts }
    }

    /// Load a fresh view model for `user`.
    ///
    /// Failed reads leave their field empty and are returned as diagnostics.
    pub async fn load(&self, user: Option<UserId>) -> (ViewModel, Vec<LoadDiagnostic>) {
        let mut view = ViewModel::default();
        let diagnostics = view.merge(self.fetch(user).await);
        (view, diagnostics)
    }
}
