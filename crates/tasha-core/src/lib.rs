#![deny(warnings)]

//! Core data model and invariants for the tasha event calculator.
//!
//! This crate defines the serializable event table (per-category tier rules,
//! purchasable packs, daily rewards) with validation helpers that guarantee
//! the tier table partitions the non-negative integers as the engine expects.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU64;
use thiserror::Error;

/// Key of a resource category, e.g. "skill", "rune", "stellar".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CategoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One band of a category's reward schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Cumulative upper bound in convertible units (inclusive).
    pub max: u64,
    /// Convertible units required per reward cycle inside this tier.
    pub cost: u64,
    /// Reward granted per completed cycle.
    pub reward: u64,
}

impl Tier {
    pub const fn new(max: u64, cost: u64, reward: u64) -> Self {
        Self { max, cost, reward }
    }
}

/// Static conversion rules for one resource category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Category key.
    pub id: CategoryId,
    /// Points earned per convertible unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_item_points: Option<u64>,
    /// Premium currency (stellarite) price of one raw unit. Only categories
    /// that can be bought with premium currency carry this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_item_premium_cost: Option<NonZeroU64>,
    /// Raw units are floor-divided by this to yield convertible units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_divisor: Option<NonZeroU64>,
    /// Reward schedule ordered by ascending `max`.
    pub tiers: Vec<Tier>,
}

impl ResourceConfig {
    /// Hard cap in convertible units: the final tier's `max`.
    pub fn cap(&self) -> u64 {
        self.tiers.last().map(|t| t.max).unwrap_or(0)
    }

    /// Whether raw units of this category can be bought with premium currency.
    pub fn is_premium_fundable(&self) -> bool {
        self.per_item_premium_cost.is_some()
    }

    /// Tiers paired with their implicit lower bound (the previous tier's `max`).
    pub fn spans(&self) -> impl Iterator<Item = (u64, &Tier)> + '_ {
        let lowers = std::iter::once(0).chain(self.tiers.iter().map(|t| t.max));
        lowers.zip(self.tiers.iter())
    }
}

/// A purchasable bundle that grants a fixed reward per copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Pack key, e.g. "pack-499".
    pub id: String,
    /// Reward granted per pack.
    pub reward: u64,
    /// Premium currency price per pack, if bought with stellarite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_cost: Option<u64>,
}

/// Full economy of one limited-time event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Human-readable event name.
    pub name: String,
    /// Data version of this table.
    #[serde(default)]
    pub version: u32,
    /// Last day of the event, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_on: Option<NaiveDate>,
    /// Reward granted per remaining event day.
    #[serde(default)]
    pub daily_reward: u64,
    /// Points above this total are flagged as overflow.
    #[serde(default = "default_points_cap")]
    pub points_cap: u64,
    /// Categories in presentation and optimizer iteration order.
    pub categories: Vec<ResourceConfig>,
    /// Purchasable packs.
    #[serde(default)]
    pub packs: Vec<PackConfig>,
}

fn default_points_cap() -> u64 {
    9_000
}

impl EventConfig {
    /// Look up a category's rules.
    pub fn category(&self, id: &CategoryId) -> Result<&ResourceConfig, ConfigError> {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| ConfigError::UnknownCategory(id.0.clone()))
    }

    /// Premium-fundable categories in table order.
    pub fn premium_categories(&self) -> impl Iterator<Item = &ResourceConfig> + '_ {
        self.categories.iter().filter(|c| c.is_premium_fundable())
    }

    /// Look up a pack by id.
    pub fn pack(&self, id: &str) -> Result<&PackConfig, ConfigError> {
        self.packs
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ConfigError::UnknownPack(id.to_string()))
    }

    /// Whole days from `today` until `ends_on`, clamped at zero. `None` when
    /// the table carries no end date.
    pub fn days_left(&self, today: NaiveDate) -> Option<u64> {
        self.ends_on
            .map(|end| (end - today).num_days().max(0) as u64)
    }

    /// The reference event table.
    pub fn reference() -> Self {
        let nz = NonZeroU64::new;
        let categories = vec![
            ResourceConfig {
                id: "skill".into(),
                per_item_points: Some(10),
                per_item_premium_cost: nz(100),
                conversion_divisor: None,
                tiers: vec![Tier::new(150, 30, 20), Tier::new(850, 50, 50)],
            },
            ResourceConfig {
                id: "melo".into(),
                per_item_points: Some(15),
                per_item_premium_cost: nz(150),
                conversion_divisor: None,
                tiers: vec![Tier::new(150, 10, 15), Tier::new(700, 50, 75)],
            },
            ResourceConfig {
                id: "mount".into(),
                per_item_points: Some(2),
                per_item_premium_cost: None,
                conversion_divisor: None,
                tiers: vec![Tier::new(150, 25, 10), Tier::new(600, 50, 20)],
            },
            ResourceConfig {
                id: "artifact".into(),
                per_item_points: Some(3),
                per_item_premium_cost: None,
                conversion_divisor: nz(10),
                tiers: vec![Tier::new(300, 50, 10), Tier::new(1100, 100, 20)],
            },
            ResourceConfig {
                id: "rune".into(),
                per_item_points: Some(1),
                per_item_premium_cost: None,
                conversion_divisor: nz(10),
                tiers: vec![Tier::new(800, 100, 10), Tier::new(2400, 200, 20)],
            },
            ResourceConfig {
                id: "wood".into(),
                per_item_points: None,
                per_item_premium_cost: None,
                conversion_divisor: nz(10),
                tiers: vec![Tier::new(400, 50, 10), Tier::new(1100, 100, 20)],
            },
            ResourceConfig {
                id: "stellar".into(),
                per_item_points: None,
                per_item_premium_cost: nz(100),
                conversion_divisor: None,
                tiers: vec![Tier::new(150, 30, 30), Tier::new(1000, 50, 50)],
            },
        ];
        let packs = vec![
            PackConfig {
                id: "stellar-pack".to_string(),
                reward: 10,
                premium_cost: Some(40),
            },
            PackConfig {
                id: "pack-099".to_string(),
                reward: 30,
                premium_cost: None,
            },
            PackConfig {
                id: "pack-499".to_string(),
                reward: 120,
                premium_cost: None,
            },
            PackConfig {
                id: "pack-999".to_string(),
                reward: 200,
                premium_cost: None,
            },
        ];
        Self {
            name: "Tasha Exchange".to_string(),
            version: 1,
            ends_on: None,
            daily_reward: 80,
            points_cap: default_points_cap(),
            categories,
            packs,
        }
    }
}

/// Runtime input for one category; recreated on every recomputation pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryState {
    pub category: CategoryId,
    pub current_amount: u64,
}

impl CategoryState {
    pub fn new(category: impl Into<CategoryId>, current_amount: u64) -> Self {
        Self {
            category: category.into(),
            current_amount,
        }
    }
}

/// Validation errors for event table invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The table defines no categories.
    #[error("event table has no categories")]
    EmptyTable,
    /// Category key is blank.
    #[error("category id must not be empty")]
    EmptyCategoryId,
    /// Two categories share a key.
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),
    /// Category has no tiers.
    #[error("category {0} has no tiers")]
    EmptyTiers(String),
    /// Tier bounds must be strictly increasing from zero.
    #[error("tiers of {0} must have strictly increasing max above 0")]
    TiersNotIncreasing(String),
    /// Tier cost must be positive.
    #[error("tier cost of {0} must be > 0")]
    ZeroCost(String),
    /// Tier reward must be positive.
    #[error("tier reward of {0} must be > 0")]
    ZeroReward(String),
    /// Premium-fundable categories need a second tier for spend planning.
    #[error("premium-fundable category {0} needs at least two tiers")]
    MissingSecondTier(String),
    /// Premium-fundable categories are counted in raw units.
    #[error("premium-fundable category {0} must not have a conversion divisor")]
    PremiumWithDivisor(String),
    /// Pack key is blank.
    #[error("pack id must not be empty")]
    EmptyPackId,
    /// Two packs share a key.
    #[error("duplicate pack: {0}")]
    DuplicatePack(String),
}

/// Errors raised when the engine is asked about data the table does not hold.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Category key not present in the table.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// Pack key not present in the table.
    #[error("unknown pack: {0}")]
    UnknownPack(String),
    /// The table itself violates an invariant.
    #[error("invalid event table: {0}")]
    Invalid(#[from] ValidationError),
}

/// Validate a single category's tier schedule.
pub fn validate_resource(r: &ResourceConfig) -> Result<(), ValidationError> {
    let id = r.id.0.as_str();
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyCategoryId);
    }
    if r.tiers.is_empty() {
        return Err(ValidationError::EmptyTiers(id.to_string()));
    }
    for (lower, tier) in r.spans() {
        if tier.max <= lower {
            return Err(ValidationError::TiersNotIncreasing(id.to_string()));
        }
        if tier.cost == 0 {
            return Err(ValidationError::ZeroCost(id.to_string()));
        }
        if tier.reward == 0 {
            return Err(ValidationError::ZeroReward(id.to_string()));
        }
    }
    if r.is_premium_fundable() {
        if r.tiers.len() < 2 {
            return Err(ValidationError::MissingSecondTier(id.to_string()));
        }
        if r.conversion_divisor.is_some() {
            return Err(ValidationError::PremiumWithDivisor(id.to_string()));
        }
    }
    Ok(())
}

/// Validate the whole table, including uniqueness of keys.
pub fn validate_event(event: &EventConfig) -> Result<(), ValidationError> {
    if event.categories.is_empty() {
        return Err(ValidationError::EmptyTable);
    }
    let mut ids: BTreeSet<&CategoryId> = BTreeSet::new();
    for c in &event.categories {
        validate_resource(c)?;
        if !ids.insert(&c.id) {
            return Err(ValidationError::DuplicateCategory(c.id.0.clone()));
        }
    }
    let mut packs: BTreeSet<&str> = BTreeSet::new();
    for p in &event.packs {
        if p.id.trim().is_empty() {
            return Err(ValidationError::EmptyPackId);
        }
        if !packs.insert(p.id.as_str()) {
            return Err(ValidationError::DuplicatePack(p.id.clone()));
        }
    }
    Ok(())
}
