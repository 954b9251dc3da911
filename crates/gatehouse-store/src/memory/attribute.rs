//! In-memory extended attribute store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::{AttributeId, UserId};
use gatehouse_entity::attribute::{AttributeType, ExtendedAttribute};

use crate::traits::ExtendedAttributeStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryAttributeStore {
    attributes: Arc<DashMap<AttributeId, ExtendedAttribute>>,
}

impl MemoryAttributeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExtendedAttributeStore for MemoryAttributeStore {
    async fn get_all_of_type_for_owner(
        &self,
        owner_id: UserId,
        attribute_type: AttributeType,
    ) -> AppResult<Vec<ExtendedAttribute>> {
        let mut found: Vec<ExtendedAttribute> = self
            .attributes
            .iter()
            .filter(|a| a.owner_id == owner_id && a.attribute_type == attribute_type)
            .map(|a| a.value().clone())
            .collect();
        found.sort_by(|a, b| a.created_on.cmp(&b.created_on).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn add(&self, attribute: &ExtendedAttribute) -> AppResult<()> {
        self.attributes.insert(attribute.id, attribute.clone());
        Ok(())
    }

    async fn remove(&self, id: AttributeId) -> AppResult<bool> {
        Ok(self.attributes.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_filters_by_owner_and_type() {
        let store = MemoryAttributeStore::new();
        let owner = UserId::new();
        let confirm =
            ExtendedAttribute::new(owner, AttributeType::EmailConfirmationToken, "c".into());
        let reset = ExtendedAttribute::new(owner, AttributeType::PasswordResetToken, "r".into());
        let other =
            ExtendedAttribute::new(UserId::new(), AttributeType::EmailConfirmationToken, "x".into());
        for attr in [&confirm, &reset, &other] {
            store.add(attr).await.unwrap();
        }

        let found = store
            .get_all_of_type_for_owner(owner, AttributeType::EmailConfirmationToken)
            .await
            .unwrap();
        assert_eq!(found, vec![confirm.clone()]);

        assert!(store.remove(confirm.id).await.unwrap());
        assert!(!store.remove(confirm.id).await.unwrap());
    }
}
