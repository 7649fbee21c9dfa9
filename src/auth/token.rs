//! The session token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::auth::UserID;

/// Identifies a logged in user until `expires_at`.
///
/// The expiry is serialized as a Unix timestamp so that the cookie value is
/// independent of the server's timezone.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token for `user_id` that is valid for `duration` from now.
    pub fn new(user_id: UserID, duration: Duration) -> Option<Self> {
        let expires_at = OffsetDateTime::now_utc().checked_add(duration)?;

        Some(Self {
            user_id,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }
}
