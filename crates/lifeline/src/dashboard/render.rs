//! Screens rendered from a loaded view model.
//!
//! Rendering is pure: it reads the [`ViewModel`] and never goes back to the
//! store. Every screen is plain data so the CLI can print it as text (via
//! `Display`) or as JSON.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::aggregator::ViewModel;
use crate::model::{Contact, Profile};

/// Shown while the first load is outstanding.
pub const LOADING: &str = "Loading...";
/// Title of the overview screen.
pub const DASHBOARD_TITLE: &str = "Lifeline Dashboard";
/// Title of the emergency screen.
pub const EMERGENCY_TITLE: &str = "EMERGENCY ACTIVATED";
/// Label of the emergency trigger.
pub const TRIGGER_LABEL: &str = "EMERGENCY";
/// Text accompanying the emergency trigger.
pub const TRIGGER_HINT: &str =
    "Press this button in case of emergency to display your medical information";
/// Label of the control that leaves emergency mode.
pub const CANCEL_LABEL: &str = "Cancel Emergency";
/// Badge on primary contacts.
pub const PRIMARY_BADGE: &str = "Primary";

/// Emergency screen, no profile.
pub const NO_MEDICAL_INFO: &str = "No medical information available";
/// Emergency screen, no contacts.
pub const NO_EMERGENCY_CONTACTS: &str = "No emergency contacts available";
/// Overview, no profile.
pub const INCOMPLETE_PROFILE: &str = "Please complete your profile";
/// Overview, no contacts.
pub const NO_CONTACTS_YET: &str = "No contacts added yet";

const MEDICAL_HEADING: &str = "Medical Information";
const CONTACTS_HEADING: &str = "Emergency Contacts";
const PROFILE_HEADING: &str = "Your Profile";

/// Visual weight of an information line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Plain information.
    Normal,
    /// Highlighted for a responder.
    Alert,
}

/// One labelled line of medical information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoLine {
    /// Leading label, if any.
    pub label: Option<&'static str>,
    /// The value.
    pub value: String,
    /// How prominently to show it.
    pub level: Level,
}

impl InfoLine {
    fn normal(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label: Some(label),
            value: value.into(),
            level: Level::Normal,
        }
    }

    fn alert(label: Option<&'static str>, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            level: Level::Alert,
        }
    }
}

impl fmt::Display for InfoLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            Level::Normal => ' ',
            Level::Alert => '!',
        };
        match self.label {
            Some(label) => write!(f, "{marker} {label}: {}", self.value),
            None => write!(f, "{marker} {}", self.value),
        }
    }
}

/// A contact as shown on the emergency screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCard {
    /// Contact name.
    pub name: String,
    /// Relationship to the user.
    pub relationship: String,
    /// Phone number as entered.
    pub phone: String,
    /// `tel:` URI for dialing.
    pub dial_uri: String,
    /// Whether to show the primary badge.
    pub primary: bool,
}

impl From<&Contact> for ContactCard {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            relationship: contact.relationship.clone(),
            phone: contact.phone.clone(),
            dial_uri: dial_uri(&contact.phone),
            primary: contact.is_primary,
        }
    }
}

impl fmt::Display for ContactCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.primary {
            write!(f, "  [{PRIMARY_BADGE}] ")?;
        } else {
            write!(f, "  ")?;
        }
        write!(
            f,
            "{} ({}) {} <{}>",
            self.name, self.relationship, self.phone, self.dial_uri
        )
    }
}

/// A headed list that falls back to a placeholder when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section<T> {
    /// Section heading.
    pub heading: &'static str,
    /// Entries, possibly none.
    pub items: Vec<T>,
    /// Shown instead of `items` when there are none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

impl<T> Section<T> {
    fn new(heading: &'static str, items: Vec<T>, placeholder: &'static str) -> Self {
        let placeholder = items.is_empty().then_some(placeholder);
        Self {
            heading,
            items,
            placeholder,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Section<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        if let Some(placeholder) = self.placeholder {
            return writeln!(f, "  {placeholder}");
        }
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}

/// The Normal-state dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    /// Screen title.
    pub title: &'static str,
    /// Emergency trigger label.
    pub trigger: &'static str,
    /// Text under the trigger.
    pub trigger_hint: &'static str,
    /// Profile summary.
    pub profile: Section<InfoLine>,
    /// Number of contacts.
    pub contact_count: usize,
    /// Contact count as shown.
    pub contact_summary: String,
}

impl fmt::Display for Overview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        writeln!(f, "[ {} ]", self.trigger)?;
        writeln!(f, "{}", self.trigger_hint)?;
        writeln!(f)?;
        write!(f, "{}", self.profile)?;
        writeln!(f)?;
        writeln!(f, "{CONTACTS_HEADING}")?;
        writeln!(f, "  {}", self.contact_summary)
    }
}

/// The Active-state emergency information screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyView {
    /// Screen title.
    pub title: &'static str,
    /// Medical information lines.
    pub medical: Section<InfoLine>,
    /// Every contact in display order.
    pub contacts: Section<ContactCard>,
    /// Label of the cancel control.
    pub cancel: &'static str,
}

impl fmt::Display for EmergencyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        write!(f, "{}", self.medical)?;
        writeln!(f)?;
        write!(f, "{}", self.contacts)?;
        writeln!(f)?;
        writeln!(f, "[ {} ]", self.cancel)
    }
}

/// What the dashboard is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    /// First load still outstanding.
    Loading,
    /// Normal state.
    Overview(Overview),
    /// Active state.
    Emergency(EmergencyView),
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => writeln!(f, "{LOADING}"),
            Self::Overview(overview) => write!(f, "{overview}"),
            Self::Emergency(emergency) => write!(f, "{emergency}"),
        }
    }
}

/// Render the Normal-state dashboard.
pub fn render_overview(view: &ViewModel) -> Overview {
    let profile_lines = view
        .profile
        .as_ref()
        .map(profile_summary)
        .unwrap_or_default();

    Overview {
        title: DASHBOARD_TITLE,
        trigger: TRIGGER_LABEL,
        trigger_hint: TRIGGER_HINT,
        profile: Section::new(PROFILE_HEADING, profile_lines, INCOMPLETE_PROFILE),
        contact_count: view.contacts.len(),
        contact_summary: contact_summary(view.contacts.len()),
    }
}

/// Render the Active-state emergency screen.
pub fn render_emergency(view: &ViewModel) -> EmergencyView {
    let medical = view
        .profile
        .as_ref()
        .map(medical_lines)
        .unwrap_or_default();
    let contacts = view.contacts.iter().map(ContactCard::from).collect();

    EmergencyView {
        title: EMERGENCY_TITLE,
        medical: Section::new(MEDICAL_HEADING, medical, NO_MEDICAL_INFO),
        contacts: Section::new(CONTACTS_HEADING, contacts, NO_EMERGENCY_CONTACTS),
        cancel: CANCEL_LABEL,
    }
}

fn profile_summary(profile: &Profile) -> Vec<InfoLine> {
    let mut lines = vec![InfoLine::normal("Name", &profile.full_name)];
    if let Some(blood_type) = profile.blood_type {
        lines.push(InfoLine::normal("Blood Type", blood_type.as_str()));
    }
    if profile.has_diabetes {
        lines.push(InfoLine::alert(None, "Has Diabetes"));
    }
    lines
}

fn medical_lines(profile: &Profile) -> Vec<InfoLine> {
    let mut lines = vec![InfoLine::normal("Name", &profile.full_name)];
    if let Some(blood_type) = profile.blood_type {
        lines.push(InfoLine::normal("Blood Type", blood_type.as_str()));
    }
    if profile.has_diabetes {
        lines.push(InfoLine::alert(Some("ALERT"), "Patient has diabetes"));
    }
    if !profile.allergies.is_empty() {
        lines.push(InfoLine::alert(Some("Allergies"), &profile.allergies));
    }

    let optional = [
        ("Medical Conditions", &profile.medical_conditions),
        ("Medications", &profile.medications),
        ("Emergency Notes", &profile.emergency_notes),
    ];
    lines.extend(
        optional
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| InfoLine::normal(label, value)),
    );

    lines
}

fn contact_summary(count: usize) -> String {
    match count {
        0 => NO_CONTACTS_YET.to_string(),
        1 => "1 contact added".to_string(),
        n => format!("{n} contacts added"),
    }
}

/// Build a `tel:` URI, dropping everything a dialer would not accept.
///
/// # Panics
///
/// Never in practice; the pattern is a constant.
pub fn dial_uri(phone: &str) -> String {
    static NON_DIALABLE: OnceLock<Regex> = OnceLock::new();
    let pattern =
        NON_DIALABLE.get_or_init(|| Regex::new(r"[^0-9+*#]").expect("Invalid regex pattern"));
    format!("tel:{}", pattern.replace_all(phone, ""))
}
