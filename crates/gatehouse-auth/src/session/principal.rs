//! The authenticated caller, passed explicitly into every core call.

use gatehouse_core::types::{Actor, UserId};
use gatehouse_entity::permission::PermissionValue;
use gatehouse_entity::user::User;

use crate::jwt::{ClaimSet, Claims, Identity};

/// An authenticated subject and the claims it presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    claims: ClaimSet,
}

impl Principal {
    /// Builds the principal from a decoded bearer.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id(),
            username: claims.username.clone(),
            email: claims.email.clone(),
            claims: claims.claim_set(),
        }
    }

    /// A principal for a known user that carries no role or permission
    /// claims. Authorization decisions for it go to the stores.
    pub fn for_user(user: &User) -> Self {
        let identity = Identity {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        };
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            claims: ClaimSet::new(identity),
        }
    }

    /// The actor recorded in audit entries for this caller.
    pub fn actor(&self) -> Actor {
        Actor::User(self.user_id)
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Whether the presented token carried `value`.
    pub fn has_permission(&self, value: &PermissionValue) -> bool {
        self.claims.has_permission(value)
    }

    /// Whether the presented token carried the role.
    pub fn is_in_role(&self, name: &str) -> bool {
        self.claims.has_role(name)
    }
}
