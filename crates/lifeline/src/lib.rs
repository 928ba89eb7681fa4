//! `lifeline` - Medical profile and emergency contact dashboard
//!
//! This library keeps a user's medical profile and emergency contacts in a
//! record store, loads both into a dashboard view model concurrently, and
//! switches that dashboard into an emergency mode that puts everything a
//! responder needs on one screen.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;

pub use config::Config;
pub use dashboard::{Dashboard, EmergencyState, LoadStatus, Screen, ViewModel};
pub use editor::Editor;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{BloodType, Contact, ContactForm, ContactId, Profile, ProfileForm, UserId};
pub use session::{Session, SessionProvider};
pub use store::{RecordStore, Storage, StoreStats};
