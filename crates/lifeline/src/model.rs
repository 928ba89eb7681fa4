//! Record types for lifeline.
//!
//! This module defines the medical profile and emergency contact records as
//! they are held by the record store, the forms the editors submit, and the
//! display ordering of contacts.

use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identity of a user. A user's profile shares this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

/// Identity of an emergency contact, assigned by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(Uuid);

macro_rules! uuid_id {
    ($name:ident, $kind:literal) => {
        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| Error::invalid_value($kind, s))
            }
        }
    };
}

uuid_id!(UserId, "user id");
uuid_id!(ContactId, "contact id");

/// Clinical ABO/Rh blood type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    /// A positive.
    #[serde(rename = "A+")]
    APositive,
    /// A negative.
    #[serde(rename = "A-")]
    ANegative,
    /// B positive.
    #[serde(rename = "B+")]
    BPositive,
    /// B negative.
    #[serde(rename = "B-")]
    BNegative,
    /// AB positive.
    #[serde(rename = "AB+")]
    AbPositive,
    /// AB negative.
    #[serde(rename = "AB-")]
    AbNegative,
    /// O positive.
    #[serde(rename = "O+")]
    OPositive,
    /// O negative.
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    /// Every blood type, in the order editors offer them.
    pub const ALL: [BloodType; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// The clinical notation, e.g. `"O-"`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|bt| bt.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::invalid_value("blood type", s))
    }
}

/// A user's medical profile. There is at most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Same as the owning user's id.
    pub id: UserId,
    /// Full name as shown to responders.
    pub full_name: String,
    /// Blood type, if the user entered one.
    pub blood_type: Option<BloodType>,
    /// Whether the user has diabetes.
    pub has_diabetes: bool,
    /// Known allergies, free text.
    pub allergies: String,
    /// Ongoing medical conditions, free text.
    pub medical_conditions: String,
    /// Current medications, free text.
    pub medications: String,
    /// Anything else responders should know.
    pub emergency_notes: String,
    /// Set by the store when the row is provisioned.
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every save.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A freshly provisioned profile with every field blank.
    #[must_use]
    pub fn provisioned(id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: String::new(),
            blood_type: None,
            has_diabetes: false,
            allergies: String::new(),
            medical_conditions: String::new(),
            medications: String::new(),
            emergency_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An emergency contact belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Assigned by the store on creation.
    pub id: ContactId,
    /// The owning user.
    pub user_id: UserId,
    /// Contact's name.
    pub name: String,
    /// Relationship to the user, e.g. "Spouse".
    pub relationship: String,
    /// Phone number as entered.
    pub phone: String,
    /// Primary contacts are listed first.
    pub is_primary: bool,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
}

/// Compare two contacts by display order: primaries first, then oldest first.
#[must_use]
pub fn display_order(a: &Contact, b: &Contact) -> Ordering {
    (Reverse(a.is_primary), a.created_at).cmp(&(Reverse(b.is_primary), b.created_at))
}

/// Sort contacts into display order.
///
/// The sort is stable: contacts with equal keys keep their incoming order.
pub fn sort_contacts(contacts: &mut [Contact]) {
    contacts.sort_by(display_order);
}

/// Check that contacts are in display order.
#[cfg(test)]
#[must_use]
pub(crate) fn is_display_ordered(contacts: &[Contact]) -> bool {
    contacts
        .windows(2)
        .all(|pair| display_order(&pair[0], &pair[1]) != Ordering::Greater)
}

/// The editable part of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    /// Required.
    pub full_name: String,
    /// Optional blood type.
    pub blood_type: Option<BloodType>,
    /// Diabetes flag.
    pub has_diabetes: bool,
    /// Free text.
    pub allergies: String,
    /// Free text.
    pub medical_conditions: String,
    /// Free text.
    pub medications: String,
    /// Free text.
    pub emergency_notes: String,
}

impl ProfileForm {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank required field.
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(Error::required("full_name"));
        }
        Ok(())
    }
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            blood_type: profile.blood_type,
            has_diabetes: profile.has_diabetes,
            allergies: profile.allergies.clone(),
            medical_conditions: profile.medical_conditions.clone(),
            medications: profile.medications.clone(),
            emergency_notes: profile.emergency_notes.clone(),
        }
    }
}

/// The editable part of a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    /// Required.
    pub name: String,
    /// Required.
    pub relationship: String,
    /// Required.
    pub phone: String,
    /// Primary flag.
    pub is_primary: bool,
}

impl ContactForm {
    /// Build a form from its four fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        relationship: impl Into<String>,
        phone: impl Into<String>,
        is_primary: bool,
    ) -> Self {
        Self {
            name: name.into(),
            relationship: relationship.into(),
            phone: phone.into(),
            is_primary,
        }
    }

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank required field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("relationship", &self.relationship),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                return Err(Error::required(field));
            }
        }
        Ok(())
    }
}

impl From<&Contact> for ContactForm {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            relationship: contact.relationship.clone(),
            phone: contact.phone.clone(),
            is_primary: contact.is_primary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn contact(name: &str, is_primary: bool, created_at: DateTime<Utc>) -> Contact {
        Contact {
            id: ContactId::new(),
            user_id: UserId::from_uuid(Uuid::nil()),
            name: name.to_string(),
            relationship: "Friend".to_string(),
            phone: "+15550000000".to_string(),
            is_primary,
            created_at,
        }
    }

    fn t(offset_secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::seconds(offset_secs)
    }

    #[test]
    fn test_blood_type_round_trips_through_str() {
        for bt in BloodType::ALL {
            assert_eq!(bt.as_str().parse::<BloodType>().unwrap(), bt);
        }
    }

    #[test]
    fn test_blood_type_parse_is_case_insensitive() {
        assert_eq!("ab-".parse::<BloodType>().unwrap(), BloodType::AbNegative);
        assert_eq!(" o+ ".parse::<BloodType>().unwrap(), BloodType::OPositive);
    }

    #[test]
    fn test_blood_type_rejects_unknown() {
        let err = "C+".parse::<BloodType>().unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_blood_type_serializes_as_notation() {
        let json = serde_json::to_string(&BloodType::ONegative).unwrap();
        assert_eq!(json, "\"O-\"");
    }

    #[test]
    fn test_user_id_parse() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_sort_primary_first() {
        let mut contacts = vec![contact("Amy", false, t(0)), contact("Tom", true, t(10))];
        sort_contacts(&mut contacts);
        assert_eq!(contacts[0].name, "Tom");
        assert_eq!(contacts[1].name, "Amy");
    }

    #[test]
    fn test_sort_oldest_first_within_group() {
        let mut contacts = vec![
            contact("C", false, t(30)),
            contact("B", true, t(20)),
            contact("A", false, t(10)),
            contact("D", true, t(5)),
        ];
        sort_contacts(&mut contacts);
        let names: Vec<_> = contacts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["D", "B", "A", "C"]);
        assert!(is_display_ordered(&contacts));
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut contacts = vec![
            contact("first", false, t(0)),
            contact("second", false, t(0)),
            contact("third", false, t(0)),
        ];
        sort_contacts(&mut contacts);
        let names: Vec<_> = contacts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_multiple_primaries_sort_first() {
        let mut contacts = vec![
            contact("x", false, t(0)),
            contact("p1", true, t(1)),
            contact("p2", true, t(2)),
        ];
        sort_contacts(&mut contacts);
        assert!(contacts[0].is_primary && contacts[1].is_primary);
        assert!(!contacts[2].is_primary);
    }

    #[test]
    fn test_is_display_ordered_detects_violation() {
        let contacts = vec![contact("Amy", false, t(0)), contact("Tom", true, t(10))];
        assert!(!is_display_ordered(&contacts));
        assert!(is_display_ordered(&[]));
    }

    #[test]
    fn test_profile_form_requires_full_name() {
        let form = ProfileForm {
            full_name: "   ".to_string(),
            ..ProfileForm::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "full_name is required");

        let form = ProfileForm {
            full_name: "Jane Doe".to_string(),
            ..ProfileForm::default()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_contact_form_requires_each_field() {
        assert!(ContactForm::new("Tom", "Spouse", "+1555", false)
            .validate()
            .is_ok());

        let err = ContactForm::new("", "Spouse", "+1555", false)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("name"));

        let err = ContactForm::new("Tom", " ", "+1555", false)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("relationship"));

        let err = ContactForm::new("Tom", "Spouse", "", false)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("phone"));
    }

    #[test]
    fn test_provisioned_profile_is_blank() {
        let id = UserId::new();
        let profile = Profile::provisioned(id, t(0));
        assert_eq!(profile.id, id);
        assert!(profile.full_name.is_empty());
        assert!(profile.blood_type.is_none());
        assert!(!profile.has_diabetes);
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn test_profile_form_from_profile() {
        let mut profile = Profile::provisioned(UserId::new(), t(0));
        profile.full_name = "Jane Doe".to_string();
        profile.blood_type = Some(BloodType::ONegative);
        let form = ProfileForm::from(&profile);
        assert_eq!(form.full_name, "Jane Doe");
        assert_eq!(form.blood_type, Some(BloodType::ONegative));
    }

    #[test]
    fn test_contact_serialization() {
        let c = contact("Tom", true, t(0));
        let json = serde_json::to_string(&c).unwrap();
        let back: Contact = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
