//! Account identity.

use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// The logged-in user as known to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
}
