#![deny(warnings)]

//! One full recomputation pass over a player's event inputs.
//!
//! Converts every category of the table, runs the stellarite planner over the
//! premium-fundable subset and folds daily rewards, packs and the player's
//! current balance into a single summary. Nothing is kept between passes.

use serde::{Deserialize, Serialize};
use tasha_core::{CategoryId, CategoryState, ConfigError, EventConfig};
use tasha_econ::{convert_resource, Conversion};
use tasha_planner::{plan_spending, SpendingPlan};
use tracing::debug;

/// Copies of one pack the player intends to buy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackPurchase {
    pub id: String,
    pub quantity: u64,
}

/// Raw, already sanitized player inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInputs {
    /// Raw quantities; categories not listed count as zero.
    pub amounts: Vec<CategoryState>,
    /// Stellarite available for the planner.
    pub premium_budget: u64,
    /// Reward already held.
    pub current_reward: u64,
    /// Event days remaining.
    pub days_left: u64,
    pub packs: Vec<PackPurchase>,
}

impl PlayerInputs {
    fn amount_of(&self, id: &CategoryId) -> u64 {
        self.amounts
            .iter()
            .filter(|s| &s.category == id)
            .map(|s| s.current_amount)
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: CategoryId,
    pub raw_amount: u64,
    pub conversion: Conversion,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackBreakdown {
    pub id: String,
    pub quantity: u64,
    pub reward: u64,
    /// Stellarite these packs cost, zero for cash packs.
    pub premium_cost: u64,
}

/// Everything the presentation layer renders after one pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Per-category results in table order.
    pub breakdown: Vec<CategoryBreakdown>,
    pub total_points: u64,
    /// Total points exceed the table's points cap.
    pub points_overflow: bool,
    /// Reward from converting resources.
    pub base_reward: u64,
    /// Reward from remaining event days.
    pub daily_reward: u64,
    pub packs: Vec<PackBreakdown>,
    pub package_reward: u64,
    /// Stellarite consumed by packs. Reported only; the planner budget is
    /// not reduced by it.
    pub pack_premium_cost: u64,
    pub current_reward: u64,
    pub plan: SpendingPlan,
    /// current + base + daily + packages + planner extra.
    pub total_possible: u64,
}

/// Run one recomputation pass.
///
/// Fails with [`ConfigError`] when an input names a category or pack that the
/// table does not define.
pub fn recompute(event: &EventConfig, inputs: &PlayerInputs) -> Result<EventSummary, ConfigError> {
    for s in &inputs.amounts {
        event.category(&s.category)?;
    }

    let mut breakdown = Vec::with_capacity(event.categories.len());
    let mut total_points: u64 = 0;
    let mut base_reward: u64 = 0;
    for resource in &event.categories {
        let raw_amount = inputs.amount_of(&resource.id);
        let conversion = convert_resource(resource, raw_amount);
        total_points = total_points.saturating_add(conversion.points);
        base_reward = base_reward.saturating_add(conversion.reward);
        breakdown.push(CategoryBreakdown {
            category: resource.id.clone(),
            raw_amount,
            conversion,
        });
    }

    let mut packs = Vec::with_capacity(inputs.packs.len());
    for p in &inputs.packs {
        let cfg = event.pack(&p.id)?;
        packs.push(PackBreakdown {
            id: cfg.id.clone(),
            quantity: p.quantity,
            reward: p.quantity.saturating_mul(cfg.reward),
            premium_cost: p.quantity.saturating_mul(cfg.premium_cost.unwrap_or(0)),
        });
    }
    let package_reward = packs.iter().map(|p| p.reward).fold(0u64, u64::saturating_add);
    let pack_premium_cost = packs
        .iter()
        .map(|p| p.premium_cost)
        .fold(0u64, u64::saturating_add);

    let premium_states: Vec<CategoryState> = event
        .premium_categories()
        .map(|r| CategoryState::new(r.id.clone(), inputs.amount_of(&r.id)))
        .collect();
    let plan = plan_spending(event, inputs.premium_budget, &premium_states)?;

    let daily_reward = inputs.days_left.saturating_mul(event.daily_reward);
    let total_possible = [
        inputs.current_reward,
        base_reward,
        daily_reward,
        package_reward,
        plan.total_extra_reward,
    ]
    .into_iter()
    .fold(0u64, u64::saturating_add);

    debug!(
        total_points,
        base_reward,
        daily_reward,
        package_reward,
        extra = plan.total_extra_reward,
        total_possible,
        "recomputed"
    );

    Ok(EventSummary {
        breakdown,
        total_points,
        points_overflow: total_points > event.points_cap,
        base_reward,
        daily_reward,
        packs,
        package_reward,
        pack_premium_cost,
        current_reward: inputs.current_reward,
        plan,
        total_possible,
    })
}
