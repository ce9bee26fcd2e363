//! Stockpile - a player's build resources

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::registry::ResourceType;

/// Default capacity for a resource with no explicit capacity
const DEFAULT_CAPACITY: u32 = 1000;

/// Resources held by one player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stockpile {
    /// Resources stored: type -> (current, capacity)
    resources: AHashMap<ResourceType, (u32, u32)>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set capacity for a resource type, trimming any excess
    pub fn set_capacity(&mut self, resource: ResourceType, capacity: u32) {
        let entry = self.resources.entry(resource).or_insert((0, 0));
        entry.1 = capacity;
        entry.0 = entry.0.min(capacity);
    }

    /// Get current amount of a resource
    pub fn get(&self, resource: ResourceType) -> u32 {
        self.resources.get(&resource).map(|(c, _)| *c).unwrap_or(0)
    }

    /// Get capacity for a resource
    pub fn capacity(&self, resource: ResourceType) -> u32 {
        self.resources
            .get(&resource)
            .map(|(_, cap)| *cap)
            .unwrap_or(DEFAULT_CAPACITY)
    }

    /// Add resources, returns amount actually added
    pub fn add(&mut self, resource: ResourceType, amount: u32) -> u32 {
        let entry = self
            .resources
            .entry(resource)
            .or_insert((0, DEFAULT_CAPACITY));
        let space = entry.1.saturating_sub(entry.0);
        let added = amount.min(space);
        entry.0 += added;
        added
    }

    /// Remove resources, returns amount actually removed
    pub fn remove(&mut self, resource: ResourceType, amount: u32) -> u32 {
        if let Some(entry) = self.resources.get_mut(&resource) {
            let removed = amount.min(entry.0);
            entry.0 -= removed;
            removed
        } else {
            0
        }
    }

    /// Check if the stockpile covers `count` repetitions of `cost`
    pub fn can_afford(&self, cost: &[(ResourceType, u32)], count: u32) -> bool {
        cost.iter()
            .all(|(res, amount)| u64::from(self.get(*res)) >= u64::from(*amount) * u64::from(count))
    }

    /// Pay for `count` repetitions of `cost`, returns false (and pays nothing) if short
    pub fn spend(&mut self, cost: &[(ResourceType, u32)], count: u32) -> bool {
        if !self.can_afford(cost, count) {
            return false;
        }
        for (res, amount) in cost {
            self.remove(*res, amount * count);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stockpile_add_remove() {
        let mut stockpile = Stockpile::new();
        stockpile.set_capacity(ResourceType::Wood, 50);

        assert_eq!(stockpile.add(ResourceType::Wood, 30), 30);
        assert_eq!(stockpile.get(ResourceType::Wood), 30);

        // Can't exceed capacity
        assert_eq!(stockpile.add(ResourceType::Wood, 30), 20);
        assert_eq!(stockpile.get(ResourceType::Wood), 50);

        assert_eq!(stockpile.remove(ResourceType::Wood, 20), 20);
        assert_eq!(stockpile.get(ResourceType::Wood), 30);
    }

    #[test]
    fn test_can_afford_scales_with_count() {
        let mut stockpile = Stockpile::new();
        stockpile.add(ResourceType::Stone, 20);

        let wall = [(ResourceType::Stone, 5)];
        assert!(stockpile.can_afford(&wall, 4));
        assert!(!stockpile.can_afford(&wall, 5));
        assert!(stockpile.can_afford(&[], 100));
    }

    #[test]
    fn test_spend_is_all_or_nothing() {
        let mut stockpile = Stockpile::new();
        stockpile.add(ResourceType::Wood, 50);
        stockpile.add(ResourceType::Stone, 5);

        let house = [(ResourceType::Wood, 20), (ResourceType::Stone, 10)];
        assert!(!stockpile.spend(&house, 1));
        assert_eq!(stockpile.get(ResourceType::Wood), 50);

        stockpile.add(ResourceType::Stone, 5);
        assert!(stockpile.spend(&house, 1));
        assert_eq!(stockpile.get(ResourceType::Wood), 30);
        assert_eq!(stockpile.get(ResourceType::Stone), 0);
    }
}
