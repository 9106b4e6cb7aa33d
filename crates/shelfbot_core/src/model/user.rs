//! Chat user identity record.

use serde::{Deserialize, Serialize};

/// External identity assigned by the chat network.
pub type ExternalUserId = i64;

/// Known user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal row id, referenced by favorites.
    pub id: i64,
    /// Unique external identity.
    pub external_id: ExternalUserId,
    /// Last observed display handle.
    pub handle: Option<String>,
}
