//! Test doubles and fixtures for the dashboard.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Barrier;

use crate::error::{Error, Result};
use crate::model::{BloodType, Contact, ContactId, Profile, UserId};
use crate::store::RecordStore;

/// In-memory record store with failure injection and call counting.
#[derive(Debug, Default)]
pub(crate) struct FakeStore {
    profiles: Mutex<HashMap<UserId, Profile>>,
    contacts: Mutex<HashMap<UserId, Vec<Contact>>>,
    fail_profile: AtomicBool,
    fail_contacts: AtomicBool,
    calls: AtomicUsize,
    rendezvous: Option<Barrier>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every read blocks until a second read has started.
    pub(crate) fn with_rendezvous() -> Self {
        Self {
            rendezvous: Some(Barrier::new(2)),
            ..Self::default()
        }
    }

    pub(crate) fn put_profile(&self, profile: Profile) {
        self.profiles.lock().unwrap().insert(profile.id, profile);
    }

    /// Contacts are returned exactly in the order given.
    pub(crate) fn put_contacts(&self, user: UserId, contacts: Vec<Contact>) {
        self.contacts.lock().unwrap().insert(user, contacts);
    }

    pub(crate) fn fail_profile(&self, fail: bool) {
        self.fail_profile.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_contacts(&self, fail: bool) {
        self.fail_contacts.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn read_profile(&self, user: UserId) -> Result<Option<Profile>> {
        self.enter().await;
        if self.fail_profile.load(Ordering::SeqCst) {
            return Err(Error::internal("profile read refused"));
        }
        Ok(self.profiles.lock().unwrap().get(&user).cloned())
    }

    async fn read_contacts(&self, user: UserId) -> Result<Vec<Contact>> {
        self.enter().await;
        if self.fail_contacts.load(Ordering::SeqCst) {
            return Err(Error::internal("contacts read refused"));
        }
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }
}

pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Jane Doe: O-, not diabetic, allergic to penicillin, nothing else.
pub(crate) fn jane_doe(user: UserId) -> Profile {
    Profile {
        full_name: "Jane Doe".to_string(),
        blood_type: Some(BloodType::ONegative),
        allergies: "Penicillin".to_string(),
        ..Profile::provisioned(user, at(0))
    }
}

pub(crate) fn contact(
    user: UserId,
    name: &str,
    relationship: &str,
    phone: &str,
    is_primary: bool,
    created_at: DateTime<Utc>,
) -> Contact {
    Contact {
        id: ContactId::new(),
        user_id: user,
        name: name.to_string(),
        relationship: relationship.to_string(),
        phone: phone.to_string(),
        is_primary,
        created_at,
    }
}

/// Amy (friend, created first) then Tom (primary spouse, created later),
/// in creation order.
pub(crate) fn tom_and_amy(user: UserId) -> Vec<Contact> {
    vec![
        contact(user, "Amy", "Friend", "+15557654321", false, at(10)),
        contact(user, "Tom", "Spouse", "+15551234567", true, at(20)),
    ]
}
