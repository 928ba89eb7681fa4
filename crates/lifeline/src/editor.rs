//! Profile and contact editing for the signed-in user.
//!
//! Every operation resolves the current user from the session first and
//! fails with [`Error::NotSignedIn`] when there is none.

use std::fmt;

use tracing::info;

use crate::config::ContactsConfig;
use crate::error::{Error, Result};
use crate::model::{Contact, ContactForm, ContactId, Profile, ProfileForm, UserId};
use crate::session::SessionProvider;
use crate::store::Storage;

/// Edits the records of whoever is signed in.
pub struct Editor<'a> {
    storage: &'a Storage,
    session: &'a dyn SessionProvider,
    single_primary: bool,
}

impl fmt::Debug for Editor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("user", &self.session.current_user_id())
            .field("single_primary", &self.single_primary)
            .finish_non_exhaustive()
    }
}

impl<'a> Editor<'a> {
    /// Create an editor over `storage` acting for `session`'s user.
    pub fn new(
        storage: &'a Storage,
        session: &'a dyn SessionProvider,
        contacts: &ContactsConfig,
    ) -> Self {
        Self {
            storage,
            session,
            single_primary: contacts.single_primary,
        }
    }

    fn user(&self) -> Result<UserId> {
        self.session.current_user_id().ok_or(Error::NotSignedIn)
    }

    // === Profile ===

    /// The profile form pre-filled from the stored profile.
    ///
    /// A user with no profile row yet gets a blank form.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, or an error if the store read fails.
    pub fn load_profile_form(&self) -> Result<ProfileForm> {
        let user = self.user()?;
        Ok(self
            .storage
            .get_profile(user)?
            .map(|profile| ProfileForm::from(&profile))
            .unwrap_or_default())
    }

    /// Validate and save the profile form.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, a validation error, `ProfileNotFound`, or an
    /// error if the store write fails.
    pub fn save_profile(&self, form: &ProfileForm) -> Result<Profile> {
        let user = self.user()?;
        form.validate()?;
        let profile = self.storage.update_profile(user, form)?;
        info!(user = %user, "Profile saved");
        Ok(profile)
    }

    // === Contacts ===

    /// The user's contacts in display order.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, or an error if the store read fails.
    pub fn list_contacts(&self) -> Result<Vec<Contact>> {
        let user = self.user()?;
        self.storage.list_contacts(user)
    }

    /// Validate and add a contact.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, a validation error, or an error if the store
    /// write fails.
    pub fn add_contact(&self, form: &ContactForm) -> Result<Contact> {
        let user = self.user()?;
        form.validate()?;
        let contact = self
            .storage
            .insert_contact(user, form, self.single_primary)?;
        info!(user = %user, contact = %contact.id, "Contact added");
        Ok(contact)
    }

    /// Validate and overwrite a contact.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, a validation error, `ContactNotFound`, or an
    /// error if the store write fails.
    pub fn update_contact(&self, id: ContactId, form: &ContactForm) -> Result<Contact> {
        let user = self.user()?;
        form.validate()?;
        let contact = self
            .storage
            .update_contact(user, id, form, self.single_primary)?;
        info!(user = %user, contact = %id, "Contact updated");
        Ok(contact)
    }

    /// The contact form for one of the user's contacts.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, `ContactNotFound`, or an error if the store
    /// read fails.
    pub fn load_contact_form(&self, id: ContactId) -> Result<ContactForm> {
        let user = self.user()?;
        self.storage
            .get_contact(user, id)?
            .map(|contact| ContactForm::from(&contact))
            .ok_or_else(|| Error::ContactNotFound {
                contact_id: id.to_string(),
            })
    }

    /// Delete a contact.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn`, `ContactNotFound`, or an error if the store
    /// write fails.
    pub fn remove_contact(&self, id: ContactId) -> Result<()> {
        let user = self.user()?;
        if !self.storage.delete_contact(user, id)? {
            return Err(Error::ContactNotFound {
                contact_id: id.to_string(),
            });
        }
        info!(user = %user, contact = %id, "Contact removed");
        Ok(())
    }
}
