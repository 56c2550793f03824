//! User models.

use crate::{Keyed, UserId};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Discriminator value meaning "no legacy discriminator".
pub const NO_DISCRIMINATOR: &str = "0";

/// A Discord user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct User {
    /// User ID
    #[setters(skip)]
    pub id: UserId,
    /// Username without @
    pub username: String,
    /// Legacy 4-digit discriminator, "0" for migrated accounts
    #[serde(default = "default_discriminator")]
    pub discriminator: String,
    /// Display name
    #[serde(default)]
    pub global_name: Option<String>,
    /// True if bot account
    #[serde(default)]
    pub bot: bool,
}

fn default_discriminator() -> String {
    NO_DISCRIMINATOR.to_string()
}

impl User {
    /// Create a user without a legacy discriminator.
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            discriminator: default_discriminator(),
            global_name: None,
            bot: false,
        }
    }

    /// Username as it should be displayed.
    ///
    /// Accounts migrated off legacy discriminators are shown by username
    /// alone, everyone else as `username#discriminator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use herald_core::{User, UserId};
    ///
    /// let modern = User::new(UserId(1), "ada");
    /// assert_eq!(modern.tag(), "ada");
    ///
    /// let legacy = User::new(UserId(2), "grace").with_discriminator("1906");
    /// assert_eq!(legacy.tag(), "grace#1906");
    /// ```
    pub fn tag(&self) -> String {
        if self.discriminator == NO_DISCRIMINATOR {
            self.username.clone()
        } else {
            format!("{}#{}", self.username, self.discriminator)
        }
    }
}

impl Keyed for User {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.id
    }
}
