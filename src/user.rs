//! Users - transient vs persisted identity
//!
//! "Not yet saved" is a separate type, not a sentinel id: a [`NewUser`] has
//! no identity at all until the store inserts it and hands back a [`User`]
//! carrying the database-assigned id. The two states cannot be confused at
//! compile time, and a transient value can never compare equal to a
//! persisted one.

use serde::{Deserialize, Serialize};

/// A user that has not been inserted yet. Carries every field except the id,
/// which only the database can assign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub description: String,
    pub role_id: i64,
}

impl NewUser {
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        description: impl Into<String>,
        role_id: i64,
    ) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            description: description.into(),
            role_id,
        }
    }
}

/// A persisted user row.
///
/// Equality is identity equality: two users are the same user iff they carry
/// the same database id, whatever their other fields say. The password field
/// is stored in plaintext by the schema; that weakness is inherited from the
/// data model and deliberately not papered over here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password: String,
    pub description: String,
    pub role_id: i64,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl std::hash::Hash for User {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.id, self.login)
    }
}
