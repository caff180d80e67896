use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use persona_core::error::{PersonaError, Result};
use persona_core::estimation::TraitEstimator;
use persona_core::personality::{BigFive, TraitMap, TraitProfile};

/// Stub estimator drawing uniform scores. Seeded instances are reproducible.
pub struct RandomEstimator {
    rng: Mutex<StdRng>,
}

impl RandomEstimator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl TraitEstimator for RandomEstimator {
    fn name(&self) -> &str {
        "random"
    }

    async fn estimate(
        &self,
        entity_ids: &BTreeSet<String>,
        _texts: Option<&BTreeMap<String, String>>,
    ) -> Result<TraitMap> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| PersonaError::Estimation("random estimator state poisoned".into()))?;

        let mut out = TraitMap::new();
        for id in entity_ids {
            let mut profile = TraitProfile::new();
            for t in BigFive::ALL {
                profile.set(t.as_str(), rng.gen::<f64>());
            }
            out.insert(id.clone(), profile);
        }
        Ok(out)
    }
}
