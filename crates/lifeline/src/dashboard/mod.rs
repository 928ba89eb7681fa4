//! The dashboard: loads a user's records and decides which screen to show.
//!
//! A [`Dashboard`] owns the view model and is the only thing that writes it.
//! Loads are split into [`Dashboard::begin_load`], the fetch, and
//! [`Dashboard::apply`] so that a response belonging to an older load can be
//! recognised and dropped. Every `begin_load` bumps a generation counter; a
//! fetch is applied only if its ticket still carries the latest generation.

pub mod aggregator;
pub mod controller;
pub mod render;

#[cfg(test)]
pub(crate) mod testing;

use tokio::sync::watch;
use tracing::debug;

use crate::model::UserId;
use crate::store::RecordStore;

pub use aggregator::{Aggregator, Fetched, LoadDiagnostic, RecordKind, ViewModel};
pub use controller::{EmergencyController, EmergencyState};
pub use render::{render_emergency, render_overview, Screen};

/// Handle for one load, issued by [`Dashboard::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    user: Option<UserId>,
}

impl LoadTicket {
    /// The user this load is for.
    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// Position of this load in issue order.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a load when it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The view model was updated. Any failed reads are listed.
    Loaded(Vec<LoadDiagnostic>),
    /// No one is signed in; the view model was cleared.
    SignedOut,
    /// A newer load had been started; this result was dropped.
    Stale,
}

impl LoadStatus {
    /// Diagnostics from an applied load, empty otherwise.
    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        match self {
            Self::Loaded(diagnostics) => diagnostics,
            Self::SignedOut | Self::Stale => &[],
        }
    }
}

/// Profile-and-contacts dashboard with an emergency mode.
#[derive(Debug)]
pub struct Dashboard<S> {
    aggregator: Aggregator<S>,
    view: ViewModel,
    loaded: bool,
    user: Option<UserId>,
    generation: u64,
    controller: EmergencyController,
}

impl<S: RecordStore> Dashboard<S> {
    /// A freshly mounted dashboard: nothing loaded, emergency mode off.
    pub fn mount(store: S) -> Self {
        Self {
            aggregator: Aggregator::new(store),
            view: ViewModel::default(),
            loaded: false,
            user: None,
            generation: 0,
            controller: EmergencyController::new(),
        }
    }

    /// The aggregator performing this dashboard's reads.
    pub fn aggregator(&self) -> &Aggregator<S> {
        &self.aggregator
    }

    /// Start a load for `user` and return its ticket.
    ///
    /// A change of identity resets the dashboard as if freshly mounted:
    /// the view model is cleared, it counts as not loaded, and emergency mode
    /// is turned off.
    pub fn begin_load(&mut self, user: Option<UserId>) -> LoadTicket {
        self.generation += 1;

        if user != self.user {
            debug!(
                from = ?self.user.map(|u| u.to_string()),
                to = ?user.map(|u| u.to_string()),
                "Identity changed, resetting dashboard"
            );
            self.user = user;
            self.view = ViewModel::default();
            self.loaded = false;
            self.controller.reset();
        }

        LoadTicket {
            generation: self.generation,
            user,
        }
    }

    /// Perform the reads for `ticket`. Does not touch dashboard state.
    pub async fn fetch(&self, ticket: &LoadTicket) -> Fetched {
        self.aggregator.fetch(ticket.user).await
    }

    /// Apply a fetch result, unless a newer load has begun since `ticket`.
    pub fn apply(&mut self, ticket: LoadTicket, fetched: Fetched) -> LoadStatus {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale load"
            );
            return LoadStatus::Stale;
        }

        if ticket.user.is_none() {
            self.view = ViewModel::default();
            self.loaded = false;
            return LoadStatus::SignedOut;
        }

        let diagnostics = self.view.merge(fetched);
        self.loaded = true;
        LoadStatus::Loaded(diagnostics)
    }

    /// Begin, fetch and apply in one go.
    pub async fn load(&mut self, user: Option<UserId>) -> LoadStatus {
        let ticket = self.begin_load(user);
        let fetched = self.fetch(&ticket).await;
        self.apply(ticket, fetched)
    }

    /// Wait for the next identity change on `session` and reload for it.
    ///
    /// Returns `None` once the session has been dropped.
    pub async fn sync_session(
        &mut self,
        session: &mut watch::Receiver<Option<UserId>>,
    ) -> Option<LoadStatus> {
        session.changed().await.ok()?;
        let user = *session.borrow_and_update();
        Some(self.load(user).await)
    }

    /// Load for the current identity, then reload on every change until the
    /// session is dropped.
    pub async fn follow_session(&mut self, mut session: watch::Receiver<Option<UserId>>) {
        let user = *session.borrow_and_update();
        self.load(user).await;
        while self.sync_session(&mut session).await.is_some() {}
    }

    /// Whether both reads have completed for the current user.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The user the dashboard is showing.
    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// The current view model.
    pub fn view_model(&self) -> &ViewModel {
        &self.view
    }

    /// Current emergency state.
    pub fn state(&self) -> EmergencyState {
        self.controller.state()
    }

    /// Whether the emergency trigger is offered.
    pub fn can_declare_emergency(&self) -> bool {
        self.controller.can_declare(self.loaded)
    }

    /// Enter emergency mode. Ignored before data has loaded.
    pub fn declare_emergency(&mut self) -> bool {
        self.controller.declare(self.loaded)
    }

    /// Leave emergency mode.
    pub fn cancel_emergency(&mut self) -> bool {
        self.controller.cancel()
    }

    /// The screen to show right now.
    pub fn screen(&self) -> Screen {
        if !self.loaded {
            return Screen::Loading;
        }
        match self.controller.state() {
            EmergencyState::Normal => Screen::Overview(render_overview(&self.view)),
            EmergencyState::Active => Screen::Emergency(render_emergency(&self.view)),
        }
    }
}
