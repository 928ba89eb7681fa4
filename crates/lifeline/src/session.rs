//! Session state: who is signed in.
//!
//! The dashboard never polls for the current user. It holds a
//! [`watch::Receiver`] and reloads whenever the identity changes.

use tokio::sync::watch;
use tracing::info;

use crate::model::UserId;

/// Source of the current user identity.
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, or `None`.
    fn current_user_id(&self) -> Option<UserId>;

    /// Subscribe to identity changes (sign-in, sign-out, switch).
    fn subscribe(&self) -> watch::Receiver<Option<UserId>>;
}

/// Process-wide session.
///
/// Create one with [`Session::init`] at startup; call
/// [`Session::sign_out`] on teardown.
#[derive(Debug)]
pub struct Session {
    tx: watch::Sender<Option<UserId>>,
}

impl Session {
    /// Start a session with the identity resolved at startup.
    #[must_use]
    pub fn init(restored: Option<UserId>) -> Self {
        let (tx, _rx) = watch::channel(restored);
        Self { tx }
    }

    /// Make `user` the current identity.
    ///
    /// Returns `true` if the identity changed. Subscribers are only
    /// notified on a change.
    pub fn sign_in(&self, user: UserId) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == Some(user) {
                false
            } else {
                *current = Some(user);
                true
            }
        });
        if changed {
            info!(user = %user, "Signed in");
        }
        changed
    }

    /// Clear the current identity.
    ///
    /// Returns `true` if someone was signed in.
    pub fn sign_out(&self) -> bool {
        let changed = self.tx.send_if_modified(|current| current.take().is_some());
        if changed {
            info!("Signed out");
        }
        changed
    }
}

impl SessionProvider for Session {
    fn current_user_id(&self) -> Option<UserId> {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}
