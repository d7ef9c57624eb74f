//! Core domain types for interaction data.
//!
//! This module defines the records the recommender trains on and the
//! in-memory store that holds them in both orientations:
//! - per-user history (user -> item -> strength), read during inference
//! - per-item history (item -> user -> strength), read while training
//!
//! Both views are `BTreeMap`s so every traversal happens in ascending id
//! order. Training sums floating point values while walking these maps,
//! and a fixed order is what makes two training runs bitwise identical.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier for a user (any `u32`)
pub type UserId = u32;

/// Identifier for an item, a dense index in `0..item_count`
pub type ItemId = u32;

/// Interaction strength: an explicit rating or an implicit signal
pub type Strength = f32;

// =============================================================================
// Records
// =============================================================================

/// A single (user, item, strength) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub strength: Strength,
}

impl Interaction {
    pub fn new(user_id: UserId, item_id: ItemId, strength: Strength) -> Self {
        Self {
            user_id,
            item_id,
            strength,
        }
    }
}

/// Closed range of valid strengths for the rating task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: Strength,
    pub upper: Strength,
}

impl Bounds {
    pub fn new(lower: Strength, upper: Strength) -> Self {
        Self { lower, upper }
    }

    /// True when `lower <= upper` and both ends are finite
    pub fn is_well_formed(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower <= self.upper
    }

    pub fn contains(&self, value: Strength) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Clip a value into `[lower, upper]`
    pub fn clip(&self, value: Strength) -> Strength {
        value.clamp(self.lower, self.upper)
    }
}

// =============================================================================
// InteractionStore
// =============================================================================

/// In-memory snapshot of all training interactions.
///
/// Built once, then shared read-only with the similarity engine and the
/// model. Duplicate (user, item) records overwrite each other, so the last
/// inserted strength wins.
#[derive(Debug, Clone)]
pub struct InteractionStore {
    /// Size of the item catalog; valid item ids are `0..item_count`
    pub(crate) item_count: usize,

    /// All interactions of each user
    pub(crate) user_items: BTreeMap<UserId, BTreeMap<ItemId, Strength>>,
    /// All interactions received by each item
    pub(crate) item_users: BTreeMap<ItemId, BTreeMap<UserId, Strength>>,

    pub(crate) bounds: Option<Bounds>,

    // Precomputed statistics
    pub(crate) global_mean: f32,
    pub(crate) interaction_count: usize,
    /// Set by `insert`, cleared by `compute_stats`
    pub(crate) stats_stale: bool,
}

impl InteractionStore {
    /// Creates an empty store for a catalog of `item_count` items
    pub fn new(item_count: usize) -> Self {
        Self {
            item_count,
            user_items: BTreeMap::new(),
            item_users: BTreeMap::new(),
            bounds: None,
            global_mean: 0.0,
            interaction_count: 0,
            stats_stale: false,
        }
    }

    /// Attach rating bounds (builder style)
    pub fn with_bounds(mut self, lower: Strength, upper: Strength) -> Self {
        self.bounds = Some(Bounds::new(lower, upper));
        self
    }

    /// Insert an interaction into both views.
    ///
    /// Marks the cached statistics stale. `global_mean` stays correct
    /// either way, but recomputes on every call until `compute_stats` runs.
    pub fn insert(&mut self, interaction: Interaction) {
        let previous = self
            .user_items
            .entry(interaction.user_id)
            .or_default()
            .insert(interaction.item_id, interaction.strength);

        self.item_users
            .entry(interaction.item_id)
            .or_default()
            .insert(interaction.user_id, interaction.strength);

        if previous.is_none() {
            self.interaction_count += 1;
        }
        self.stats_stale = true;
    }

    /// Items and strengths of one user, `None` for users absent from training
    pub fn user_history(&self, user_id: UserId) -> Option<&BTreeMap<ItemId, Strength>> {
        self.user_items.get(&user_id)
    }

    /// Users and strengths of one item, `None` when nobody interacted with it
    pub fn item_history(&self, item_id: ItemId) -> Option<&BTreeMap<UserId, Strength>> {
        self.item_users.get(&item_id)
    }

    /// Strength of a single (user, item) pair
    pub fn strength(&self, user_id: UserId, item_id: ItemId) -> Option<Strength> {
        self.user_items.get(&user_id)?.get(&item_id).copied()
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.user_items.contains_key(&user_id)
    }

    /// True when `item_id` is inside the catalog (it may still have no interactions)
    pub fn contains_item(&self, item_id: ItemId) -> bool {
        (item_id as usize) < self.item_count
    }

    /// Iterate users with their histories in ascending user id order
    pub fn users(&self) -> impl Iterator<Item = (UserId, &BTreeMap<ItemId, Strength>)> {
        self.user_items.iter().map(|(&user, items)| (user, items))
    }

    /// Iterate interacted items with their histories in ascending item id order
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &BTreeMap<UserId, Strength>)> {
        self.item_users.iter().map(|(&item, users)| (item, users))
    }

    /// Iterate every interaction in ascending (user, item) order
    pub fn interactions(&self) -> impl Iterator<Item = Interaction> + '_ {
        self.user_items.iter().flat_map(|(&user_id, items)| {
            items
                .iter()
                .map(move |(&item_id, &strength)| Interaction::new(user_id, item_id, strength))
        })
    }

    /// Mean strength over all interactions (0.0 for an empty store)
    pub fn global_mean(&self) -> f32 {
        if self.stats_stale {
            self.mean_strength()
        } else {
            self.global_mean
        }
    }

    /// True when records were inserted after the last `compute_stats`
    pub fn stats_stale(&self) -> bool {
        self.stats_stale
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Number of distinct users with at least one interaction
    pub fn user_count(&self) -> usize {
        self.user_items.len()
    }

    /// Number of distinct (user, item) pairs
    pub fn interaction_count(&self) -> usize {
        self.interaction_count
    }

    /// (users, items, interactions) for logging
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.user_count(), self.item_count, self.interaction_count)
    }
}
