//! Repository abstractions for live plans and reasoning chains
//!
//! Engines hold their state behind these traits instead of process-wide maps.
//! The in-memory implementations cover the single-process case; the traits
//! exist so tests and embedders can substitute their own storage.

use dashmap::DashMap;

use crate::plan::{Plan, PlanId};
use crate::reasoning::{ChainId, ReasoningChain};

/// Storage for plans keyed by [`PlanId`]
pub trait PlanStore: Send + Sync {
    /// Insert or replace a plan
    fn insert(&self, plan: Plan);

    /// Fetch a plan by id
    fn get(&self, id: &PlanId) -> Option<Plan>;

    /// Remove a plan, returning it if present
    fn remove(&self, id: &PlanId) -> Option<Plan>;

    /// Ids of all stored plans
    fn ids(&self) -> Vec<PlanId>;
}

/// Storage for reasoning chains keyed by [`ChainId`]
pub trait ChainStore: Send + Sync {
    /// Insert or replace a chain
    fn insert(&self, chain: ReasoningChain);

    /// Fetch a chain by id
    fn get(&self, id: &ChainId) -> Option<ReasoningChain>;

    /// Remove a chain, returning it if present
    fn remove(&self, id: &ChainId) -> Option<ReasoningChain>;

    /// Ids of all stored chains
    fn ids(&self) -> Vec<ChainId>;
}

/// In-memory plan store
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    plans: DashMap<PlanId, Plan>,
}

impl MemoryPlanStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for MemoryPlanStore {
    fn insert(&self, plan: Plan) {
        self.plans.insert(plan.id, plan);
    }

    fn get(&self, id: &PlanId) -> Option<Plan> {
        self.plans.get(id).map(|entry| entry.value().clone())
    }

    fn remove(&self, id: &PlanId) -> Option<Plan> {
        self.plans.remove(id).map(|(_, plan)| plan)
    }

    fn ids(&self) -> Vec<PlanId> {
        self.plans.iter().map(|entry| *entry.key()).collect()
    }
}

/// In-memory chain store
#[derive(Debug, Default)]
pub struct MemoryChainStore {
    chains: DashMap<ChainId, ReasoningChain>,
}

impl MemoryChainStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for MemoryChainStore {
    fn insert(&self, chain: ReasoningChain) {
        self.chains.insert(chain.id, chain);
    }

    fn get(&self, id: &ChainId) -> Option<ReasoningChain> {
        self.chains.get(id).map(|entry| entry.value().clone())
    }

    fn remove(&self, id: &ChainId) -> Option<ReasoningChain> {
        self.chains.remove(id).map(|(_, chain)| chain)
    }

    fn ids(&self) -> Vec<ChainId> {
        self.chains.iter().map(|entry| *entry.key()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::ChainContext;

    #[test]
    fn test_chain_store_roundtrip() {
        let store = MemoryChainStore::new();
        let chain = ReasoningChain::new("inspect logs".to_string(), ChainContext::default());
        let id = chain.id;

        store.insert(chain);
        assert!(store.get(&id).is_some());
        assert_eq!(store.ids(), vec![id]);

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.goal, "inspect logs");
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn test_missing_ids() {
        let plans = MemoryPlanStore::new();
        let chains = MemoryChainStore::new();
        assert!(plans.get(&PlanId::new()).is_none());
        assert!(chains.remove(&ChainId::new()).is_none());
        assert!(plans.ids().is_empty());
    }
}
