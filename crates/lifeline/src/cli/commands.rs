//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Subcommand};

use crate::model::{BloodType, ContactForm, ContactId, ProfileForm, UserId};

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// The user id printed by `signup`
    #[arg(value_parser = parse_user_id)]
    pub user_id: UserId,
}

/// Arguments for commands that print a screen or a record.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Profile commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the medical profile
    Show(ShowArgs),

    /// Change fields of the medical profile
    Edit(ProfileEdit),
}

/// Profile fields to change. Omitted fields keep their current value.
#[derive(Debug, Default, Args)]
pub struct ProfileEdit {
    /// Full name (required to save)
    #[arg(long)]
    pub full_name: Option<String>,

    /// Blood type, e.g. "O-" or "AB+"
    #[arg(long, value_parser = parse_blood_type, conflicts_with = "clear_blood_type")]
    pub blood_type: Option<BloodType>,

    /// Remove the blood type
    #[arg(long)]
    pub clear_blood_type: bool,

    /// Whether the user has diabetes
    #[arg(long, value_name = "true|false")]
    pub diabetes: Option<bool>,

    /// Allergies (empty string clears)
    #[arg(long)]
    pub allergies: Option<String>,

    /// Medical conditions (empty string clears)
    #[arg(long)]
    pub conditions: Option<String>,

    /// Current medications (empty string clears)
    #[arg(long)]
    pub medications: Option<String>,

    /// Notes for emergency responders (empty string clears)
    #[arg(long)]
    pub notes: Option<String>,
}

impl ProfileEdit {
    /// Apply the given changes to `form`.
    pub fn apply_to(self, form: &mut ProfileForm) {
        if let Some(full_name) = self.full_name {
            form.full_name = full_name;
        }
        if self.clear_blood_type {
            form.blood_type = None;
        } else if let Some(blood_type) = self.blood_type {
            form.blood_type = Some(blood_type);
        }
        if let Some(diabetes) = self.diabetes {
            form.has_diabetes = diabetes;
        }
        if let Some(allergies) = self.allergies {
            form.allergies = allergies;
        }
        if let Some(conditions) = self.conditions {
            form.medical_conditions = conditions;
        }
        if let Some(medications) = self.medications {
            form.medications = medications;
        }
        if let Some(notes) = self.notes {
            form.emergency_notes = notes;
        }
    }
}

/// Emergency contact commands.
#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// List contacts, primaries first
    List(ShowArgs),

    /// Add a contact
    Add {
        /// Contact name
        #[arg(long)]
        name: String,

        /// Relationship, e.g. "Spouse"
        #[arg(long)]
        relationship: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Mark as a primary contact
        #[arg(long)]
        primary: bool,
    },

    /// Change a contact. Omitted fields keep their current value
    Edit(ContactEdit),

    /// Delete a contact
    Remove {
        /// Contact id
        #[arg(value_parser = parse_contact_id)]
        id: ContactId,
    },
}

/// Contact fields to change.
#[derive(Debug, Args)]
pub struct ContactEdit {
    /// Contact id
    #[arg(value_parser = parse_contact_id)]
    pub id: ContactId,

    /// Contact name
    #[arg(long)]
    pub name: Option<String>,

    /// Relationship
    #[arg(long)]
    pub relationship: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Whether this is a primary contact
    #[arg(long, value_name = "true|false")]
    pub primary: Option<bool>,
}

impl ContactEdit {
    /// Apply the given changes to `form`.
    pub fn apply_to(self, form: &mut ContactForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(relationship) = self.relationship {
            form.relationship = relationship;
        }
        if let Some(phone) = self.phone {
            form.phone = phone;
        }
        if let Some(primary) = self.primary {
            form.is_primary = primary;
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn parse_user_id(s: &str) -> Result<UserId, String> {
    UserId::from_str(s).map_err(|e| e.to_string())
}

fn parse_contact_id(s: &str) -> Result<ContactId, String> {
    ContactId::from_str(s).map_err(|e| e.to_string())
}

fn parse_blood_type(s: &str) -> Result<BloodType, String> {
    BloodType::from_str(s).map_err(|e| e.to_string())
}
