use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::error::Result;
use crate::personality::TraitMap;

/// Personality trait estimation capability.
#[async_trait]
pub trait TraitEstimator: Send + Sync {
    fn name(&self) -> &str;

    /// Scores every id in `entity_ids`. `texts` optionally maps ids to the
    /// text the estimate should be based on; ids without text may receive a
    /// neutral profile.
    async fn estimate(
        &self,
        entity_ids: &BTreeSet<String>,
        texts: Option<&BTreeMap<String, String>>,
    ) -> Result<TraitMap>;
}
