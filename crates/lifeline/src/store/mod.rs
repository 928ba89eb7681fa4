//! Record store access.
//!
//! The dashboard only ever reads two things from the store: the signed-in
//! user's profile and their contacts. [`RecordStore`] is that read surface;
//! [`Storage`] implements it on `SQLite` and adds the writes the editors use.

pub mod migrations;
pub mod schema;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Contact, Profile, UserId};

pub use sqlite::{Storage, StoreStats};

/// Read access to a user's records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the profile whose id equals `user`.
    ///
    /// A user without a profile yet is `Ok(None)`, not an error.
    async fn read_profile(&self, user: UserId) -> Result<Option<Profile>>;

    /// Fetch every contact owned by `user`, primaries first, then oldest first.
    async fn read_contacts(&self, user: UserId) -> Result<Vec<Contact>>;
}

/// Reads run synchronously on the calling task behind the connection mutex,
/// so joined reads interleave but their I/O never overlaps.
#[async_trait]
impl RecordStore for Storage {
    async fn read_profile(&self, user: UserId) -> Result<Option<Profile>> {
        tracing::trace!(user = %user, "read_profile");
        self.get_profile(user)
    }

    async fn read_contacts(&self, user: UserId) -> Result<Vec<Contact>> {
        tracing::trace!(user = %user, "read_contacts");
        self.list_contacts(user)
    }
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn read_profile(&self, user: UserId) -> Result<Option<Profile>> {
        (**self).read_profile(user).await
    }

    async fn read_contacts(&self, user: UserId) -> Result<Vec<Contact>> {
        (**self).read_contacts(user).await
    }
}
