use crate::shared::entity::{Entity, ID};

const DEFAULT_DISPLAY_NAME: &str = "User";

/// The deliverable identity of a `Reminder` owner. Profiles are managed
/// elsewhere, the dispatcher only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Same as the user id referenced by `Reminder::user_id`
    pub id: ID,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Where and to whom a notification should be delivered
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub display_name: String,
    pub address: String,
}

impl Profile {
    pub fn new(id: ID) -> Self {
        Self {
            id,
            full_name: None,
            email: None,
        }
    }

    /// `None` if the profile has no deliverable address
    pub fn contact(&self) -> Option<Contact> {
        let address = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())?;

        let display_name = self
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME);

        Some(Contact {
            display_name: display_name.to_string(),
            address: address.to_string(),
        })
    }
}

impl Entity for Profile {
    fn id(&self) -> &ID {
        &self.id
    }
}
