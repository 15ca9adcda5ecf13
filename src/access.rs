//! Access of a user to a list: ownership, pending invitations and accepted shares

use serde::{Deserialize, Serialize};

use crate::list::List;
use crate::user::User;

string_enum!(
    /// State of a user's access to a list
    AccessStatus {
        Owner => "owner",
        Pending => "pending",
        Accepted => "accepted",
    }
);

/// Relates a user to a list, as returned by `getListAccesses` and the access mutations
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListAccess {
    pub list: Option<List>,
    pub user: Option<User>,
    pub status: Option<AccessStatus>,
}

impl ListAccess {
    pub fn is_pending(&self) -> bool {
        self.status == Some(AccessStatus::Pending)
    }

    pub fn is_owner(&self) -> bool {
        self.status == Some(AccessStatus::Owner)
    }
}
