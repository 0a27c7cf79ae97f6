//! Reward spin tiers and the weighted draw.
//!
//! The active tier is picked from the caller's available wallet balance.
//! Weights within a tier are relative and need not sum to 100.

use rand::Rng;
use serde::Serialize;

/// One possible outcome of a spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardOption {
    pub amount: i64,
    pub weight: u32,
}

/// A balance band with its spin cost and reward distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpinTier {
    pub name: &'static str,
    /// Inclusive lower bound on available balance.
    pub min_balance: i64,
    /// Inclusive upper bound; `None` for the open-ended top tier.
    pub max_balance: Option<i64>,
    pub cost: i64,
    pub rewards: &'static [RewardOption],
}

const fn opt(amount: i64, weight: u32) -> RewardOption {
    RewardOption { amount, weight }
}

/// Ordered by ascending `min_balance`, with contiguous bands.
pub static SPIN_TIERS: [SpinTier; 3] = [
    SpinTier {
        name: "bronze",
        min_balance: 0,
        max_balance: Some(499),
        cost: 50,
        rewards: &[opt(0, 40), opt(25, 30), opt(50, 20), opt(100, 8), opt(250, 2)],
    },
    SpinTier {
        name: "silver",
        min_balance: 500,
        max_balance: Some(1999),
        cost: 100,
        rewards: &[opt(0, 35), opt(50, 30), opt(100, 20), opt(200, 12), opt(500, 3)],
    },
    SpinTier {
        name: "gold",
        min_balance: 2000,
        max_balance: None,
        cost: 200,
        rewards: &[opt(0, 30), opt(100, 30), opt(200, 25), opt(400, 12), opt(1000, 3)],
    },
];

impl SpinTier {
    pub fn total_weight(&self) -> u32 {
        self.rewards.iter().map(|r| r.weight).sum()
    }

    pub fn contains(&self, balance: i64) -> bool {
        balance >= self.min_balance && self.max_balance.is_none_or(|max| balance <= max)
    }
}

/// Tier for the given available balance. Negative balances use the lowest tier.
pub fn tier_for_balance(balance: i64) -> &'static SpinTier {
    SPIN_TIERS
        .iter()
        .rev()
        .find(|tier| tier.contains(balance))
        .unwrap_or(&SPIN_TIERS[0])
}

/// Whether a spin at this balance can be paid for.
pub fn can_afford(balance: i64) -> bool {
    balance >= tier_for_balance(balance).cost
}

/// Pick the reward amount at `roll`, where `roll < tier.total_weight()`.
pub fn reward_at(tier: &SpinTier, roll: u32) -> i64 {
    let mut remaining = roll;
    for option in tier.rewards {
        if remaining < option.weight {
            return option.amount;
        }
        remaining -= option.weight;
    }
    tier.rewards.last().map(|r| r.amount).unwrap_or(0)
}

/// Weighted random draw over the tier's reward table.
pub fn draw<R: Rng + ?Sized>(tier: &SpinTier, rng: &mut R) -> i64 {
    let total = tier.total_weight();
    if total == 0 {
        return 0;
    }
    reward_at(tier, rng.random_range(0..total))
}
