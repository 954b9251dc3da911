//! Bearer token payload and the typed claim set decoded from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::types::UserId;
use gatehouse_entity::permission::{PermissionValue, claim_type};
use gatehouse_entity::role::Role;

/// A single `{type, value}` pair as it travels inside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireClaim {
    /// One of the [`claim_type`] constants.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Role name or `Group.Name.Access` permission value.
    pub value: String,
}

/// JWT claims payload embedded in every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Email at the time of issuance.
    pub email: String,
    /// Username at the time of issuance.
    pub username: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
    /// Role and permission claims.
    #[serde(default)]
    pub claims: Vec<WireClaim>,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Builds the typed claim set. Done once per decode.
    pub fn claim_set(&self) -> ClaimSet {
        ClaimSet::from_wire(
            Identity {
                user_id: self.user_id(),
                username: self.username.clone(),
                email: self.email.clone(),
            },
            &self.claims,
        )
    }
}

/// Who the token was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

/// One typed fact about the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Claim {
    Identity(Identity),
    Role(String),
    Permission(PermissionValue),
}

/// The typed claims of a subject, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimSet {
    claims: Vec<Claim>,
}

impl ClaimSet {
    /// A claim set holding only the identity.
    pub fn new(identity: Identity) -> Self {
        Self {
            claims: vec![Claim::Identity(identity)],
        }
    }

    /// Partitions wire claims by type. Unknown claim types and malformed
    /// permission values are dropped.
    pub fn from_wire(identity: Identity, wire: &[WireClaim]) -> Self {
        let mut set = Self::new(identity);
        for claim in wire {
            match claim.claim_type.as_str() {
                claim_type::ROLE => set.push(Claim::Role(claim.value.clone())),
                claim_type::PERMISSION => match claim.value.parse::<PermissionValue>() {
                    Ok(value) => set.push(Claim::Permission(value)),
                    Err(_) => {
                        tracing::debug!(value = %claim.value, "Dropping malformed permission claim");
                    }
                },
                other => {
                    tracing::debug!(claim_type = %other, "Dropping unknown claim type");
                }
            }
        }
        set
    }

    /// Adds a claim unless an equal one is present.
    pub fn push(&mut self, claim: Claim) {
        if !self.claims.contains(&claim) {
            self.claims.push(claim);
        }
    }

    /// Wire form of the role and permission claims. The identity travels in
    /// the registered claims instead.
    pub fn to_wire(&self) -> Vec<WireClaim> {
        self.claims
            .iter()
            .filter_map(|claim| match claim {
                Claim::Identity(_) => None,
                Claim::Role(name) => Some(WireClaim {
                    claim_type: claim_type::ROLE.to_string(),
                    value: name.clone(),
                }),
                Claim::Permission(value) => Some(WireClaim {
                    claim_type: claim_type::PERMISSION.to_string(),
                    value: value.to_string(),
                }),
            })
            .collect()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.claims.iter().find_map(|claim| match claim {
            Claim::Identity(identity) => Some(identity),
            _ => None,
        })
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.claims.iter().filter_map(|claim| match claim {
            Claim::Role(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn permissions(&self) -> impl Iterator<Item = &PermissionValue> {
        self.claims.iter().filter_map(|claim| match claim {
            Claim::Permission(value) => Some(value),
            _ => None,
        })
    }

    /// Role membership by normalized name.
    pub fn has_role(&self, name: &str) -> bool {
        let wanted = Role::normalize(name);
        self.roles().any(|role| Role::normalize(role) == wanted)
    }

    pub fn has_permission(&self, value: &PermissionValue) -> bool {
        self.permissions().any(|held| held == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: UserId::new(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    fn wire(claim_type: &str, value: &str) -> WireClaim {
        WireClaim {
            claim_type: claim_type.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_from_wire_partitions_by_type() {
        let set = ClaimSet::from_wire(
            identity(),
            &[
                wire(claim_type::ROLE, "Support"),
                wire(claim_type::PERMISSION, "Tickets.Ticket.Edit"),
                wire("something/else", "ignored"),
                wire(claim_type::PERMISSION, "not-a-permission"),
            ],
        );
        assert_eq!(set.roles().collect::<Vec<_>>(), vec!["Support"]);
        assert_eq!(set.permissions().count(), 1);
        assert!(set.has_permission(&"Tickets.Ticket.Edit".parse().unwrap()));
        assert!(set.has_role("support"));
        assert_eq!(set.identity().unwrap().username, "alice");
        assert_eq!(set.iter().count(), 3);
    }

    #[test]
    fn test_to_wire_skips_identity_and_duplicates() {
        let mut set = ClaimSet::new(identity());
        set.push(Claim::Role("Support".to_string()));
        set.push(Claim::Role("Support".to_string()));
        set.push(Claim::Permission("A.B.C".parse().unwrap()));
        let wire = set.to_wire();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].claim_type, claim_type::ROLE);
        assert_eq!(wire[1].value, "A.B.C");
    }

    #[test]
    fn test_wire_claim_field_is_named_type() {
        let json = serde_json::to_value(wire(claim_type::ROLE, "Support")).unwrap();
        assert_eq!(json["type"], claim_type::ROLE);
    }
}
