#![deny(warnings)]

//! Stellarite spending planner.
//!
//! Two greedy phases over the premium-fundable categories, both priced with
//! each category's second tier:
//! 1. finish the single in-progress cycle with the best reward per stellarite;
//! 2. with what is left, find the category (or categories, on ties) whose
//!    purchasable full cycles yield the most reward.
//!
//! Phase 2 lists equally good alternatives; it does not spend the budget on
//! all of them, so their reward is counted once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tasha_core::{CategoryId, CategoryState, ConfigError, EventConfig, ResourceConfig, Tier};
use tasha_econ::cycle_progress;
use tracing::debug;

/// Which pass of the planner produced a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Complete the cycle already in progress.
    FinishCycle,
    /// Best block of full cycles with the remaining budget.
    BestBlock,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::FinishCycle => "First",
            Phase::BestBlock => "Next",
        }
    }
}

/// Units bought for one category and what they earn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub category: CategoryId,
    /// Raw units ("pulls") bought.
    pub units: u64,
    /// Reward gained.
    pub reward: u64,
    /// Stellarite spent.
    pub premium_cost: u64,
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} pulls -> +{} tasha",
            self.category, self.units, self.reward
        )
    }
}

/// One recommendation of the plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingStep {
    pub phase: Phase,
    /// Categories affected, in category iteration order. More than one entry
    /// only for tied [`Phase::BestBlock`] alternatives.
    pub allocations: Vec<Allocation>,
}

impl SpendingStep {
    /// Reward of this step; tied alternatives count once.
    pub fn reward(&self) -> u64 {
        self.allocations.first().map(|a| a.reward).unwrap_or(0)
    }

    /// Human-readable description, tied alternatives joined by `//`.
    pub fn describe(&self) -> String {
        self.allocations
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(" // ")
    }
}

/// Ordered plan with the total extra reward it unlocks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingPlan {
    /// At most two steps: finish-cycle, then best-block.
    pub steps: Vec<SpendingStep>,
    pub total_extra_reward: u64,
    /// Budget left after the finish-cycle step.
    pub remaining_budget: u64,
}

impl SpendingPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for SpendingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("None");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", step.phase.label(), step.describe())?;
        }
        Ok(())
    }
}

/// Working view of one eligible category.
struct Track<'a> {
    resource: &'a ResourceConfig,
    item_cost: u64,
    first: Tier,
    second: Tier,
    current: u64,
}

struct PartialCandidate {
    index: usize,
    units: u64,
    premium_cost: u64,
    reward: u64,
    score: Decimal,
}

fn track(resource: &ResourceConfig, current: u64) -> Option<Track<'_>> {
    let item_cost = resource.per_item_premium_cost?.get();
    let first = *resource.tiers.first()?;
    let second = *resource.tiers.get(1)?;
    Some(Track {
        resource,
        item_cost,
        first,
        second,
        current,
    })
}

/// Phase 1: best reward density among categories with an unfinished
/// second-tier cycle that the budget can complete.
fn finish_partial_cycle(tracks: &[Track<'_>], budget: u64) -> Option<PartialCandidate> {
    let mut best: Option<PartialCandidate> = None;
    for (index, t) in tracks.iter().enumerate() {
        if t.current < t.first.max || t.current >= t.second.max {
            continue;
        }
        let progress = cycle_progress(t.current, t.first.max, &t.second);
        if progress == 0 {
            continue;
        }
        let units = t.second.cost - progress;
        if t.current + units > t.second.max {
            continue;
        }
        let premium_cost = units.saturating_mul(t.item_cost);
        if premium_cost > budget {
            debug!(category = %t.resource.id, premium_cost, budget, "partial cycle over budget");
            continue;
        }
        let score = Decimal::from(t.second.reward) / Decimal::from(premium_cost);
        debug!(category = %t.resource.id, units, premium_cost, %score, "partial cycle candidate");
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(PartialCandidate {
                index,
                units,
                premium_cost,
                reward: t.second.reward,
                score,
            });
        }
    }
    best
}

/// Phase 2: full cycles each category could buy on its own with `budget`.
fn full_blocks(tracks: &[Track<'_>], budget: u64) -> Vec<Allocation> {
    let mut blocks = Vec::new();
    for t in tracks {
        if t.current >= t.second.max {
            continue;
        }
        let room = t.second.max - t.current;
        let affordable = budget / t.item_cost;
        let usable = affordable.min(room);
        let cycles = usable / t.second.cost;
        if cycles == 0 {
            continue;
        }
        let units = cycles * t.second.cost;
        blocks.push(Allocation {
            category: t.resource.id.clone(),
            units,
            reward: cycles.saturating_mul(t.second.reward),
            premium_cost: units.saturating_mul(t.item_cost),
        });
    }
    blocks
}

/// Plan over already-resolved categories, in the given order.
///
/// Categories that cannot be bought with premium currency, or that lack a
/// second tier, are ignored.
pub fn plan_tracks(categories: &[(&ResourceConfig, u64)], budget: u64) -> SpendingPlan {
    let mut tracks: Vec<Track<'_>> = categories
        .iter()
        .filter_map(|(r, current)| track(r, *current))
        .collect();
    let mut plan = SpendingPlan {
        remaining_budget: budget,
        ..SpendingPlan::default()
    };

    if let Some(best) = finish_partial_cycle(&tracks, plan.remaining_budget) {
        let t = &mut tracks[best.index];
        t.current += best.units;
        plan.remaining_budget -= best.premium_cost;
        plan.total_extra_reward += best.reward;
        plan.steps.push(SpendingStep {
            phase: Phase::FinishCycle,
            allocations: vec![Allocation {
                category: t.resource.id.clone(),
                units: best.units,
                reward: best.reward,
                premium_cost: best.premium_cost,
            }],
        });
    }

    let blocks = full_blocks(&tracks, plan.remaining_budget);
    let top = blocks.iter().map(|b| b.reward).max().unwrap_or(0);
    if top > 0 {
        let ties: Vec<Allocation> = blocks.into_iter().filter(|b| b.reward == top).collect();
        debug!(top, ties = ties.len(), "best full block");
        plan.total_extra_reward += top;
        plan.steps.push(SpendingStep {
            phase: Phase::BestBlock,
            allocations: ties,
        });
    }
    plan
}

/// Plan stellarite spending for the given category states.
///
/// States are evaluated in slice order, which also breaks ties. Every state
/// must name a category of the table; non-premium categories are skipped.
pub fn plan_spending(
    event: &EventConfig,
    budget: u64,
    states: &[CategoryState],
) -> Result<SpendingPlan, ConfigError> {
    let mut categories = Vec::with_capacity(states.len());
    for s in states {
        let resource = event.category(&s.category)?;
        if resource.is_premium_fundable() {
            categories.push((resource, s.current_amount));
        }
    }
    Ok(plan_tracks(&categories, budget))
}
