//! Extended attribute persistence.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::{AttributeId, UserId};
use gatehouse_entity::attribute::{AttributeType, ExtendedAttribute};

/// Typed per-user key/value attributes.
#[async_trait]
pub trait ExtendedAttributeStore: Send + Sync + 'static {
    /// Every attribute of `attribute_type` owned by `owner_id`, oldest first.
    async fn get_all_of_type_for_owner(
        &self,
        owner_id: UserId,
        attribute_type: AttributeType,
    ) -> AppResult<Vec<ExtendedAttribute>>;

    /// Insert an attribute.
    async fn add(&self, attribute: &ExtendedAttribute) -> AppResult<()>;

    /// Remove an attribute. Returns `true` if a record was removed.
    async fn remove(&self, id: AttributeId) -> AppResult<bool>;
}
