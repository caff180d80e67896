use async_trait::async_trait;

use crate::entity::ExtractedEntity;
use crate::error::Result;

/// Named-entity extraction capability.
///
/// Implementations return entities in the order they occur in `text`; the
/// graph store derives entity ids from that order.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    fn name(&self) -> &str;
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>>;
}
