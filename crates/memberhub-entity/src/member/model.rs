//! Member entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use memberhub_core::types::id::{MemberId, ProfileId};

/// A registered member.
///
/// Only the columns the credential authority reads are mapped here; the
/// rest of the member row belongs to the registration service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    /// Unique member identifier.
    pub id: MemberId,
    /// The member's public profile, once created.
    pub profile_id: Option<ProfileId>,
    /// Contact email address.
    pub email: Option<String>,
    /// When the member registered.
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Projects the attributes that are embedded in issued tokens.
    pub fn profile(&self) -> MemberProfile {
        MemberProfile {
            profile_id: self.profile_id,
            email: self.email.clone(),
        }
    }
}

/// Token-facing attributes of a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Associated profile identifier.
    pub profile_id: Option<ProfileId>,
    /// Contact email address.
    pub email: Option<String>,
}
