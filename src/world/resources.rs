//! Resource stockpiles and per-faction accounts.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// An amount of each of the three resource kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    pub metal: u32,
    pub energy: u32,
    pub food: u32,
}

impl Resources {
    pub const ZERO: Resources = Resources { metal: 0, energy: 0, food: 0 };

    pub const fn new(metal: u32, energy: u32, food: u32) -> Self {
        Resources { metal, energy, food }
    }

    /// Returns true if every component is at least the matching component of `cost`.
    pub fn covers(&self, cost: &Resources) -> bool {
        self.metal >= cost.metal && self.energy >= cost.energy && self.food >= cost.food
    }

    /// Subtracts `cost`, or returns None if any component would go negative.
    pub fn checked_sub(&self, cost: &Resources) -> Option<Resources> {
        Some(Resources {
            metal: self.metal.checked_sub(cost.metal)?,
            energy: self.energy.checked_sub(cost.energy)?,
            food: self.food.checked_sub(cost.food)?,
        })
    }

    /// Scales every component by `factor`, rounding down.
    pub fn scaled_down(&self, factor: f64) -> Resources {
        let scale = |v: u32| (v as f64 * factor).floor() as u32;
        Resources {
            metal: scale(self.metal),
            energy: scale(self.energy),
            food: scale(self.food),
        }
    }

    /// Sum of all three components.
    pub fn total(&self) -> u32 {
        self.metal + self.energy + self.food
    }
}

impl Add for Resources {
    type Output = Resources;

    fn add(self, rhs: Resources) -> Resources {
        Resources {
            metal: self.metal.saturating_add(rhs.metal),
            energy: self.energy.saturating_add(rhs.energy),
            food: self.food.saturating_add(rhs.food),
        }
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Resources) {
        *self = *self + rhs;
    }
}

/// Stockpile and lifetime counters for one faction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionAccount {
    pub stockpile: Resources,
    pub ships_built: u32,
    pub enemy_ships_destroyed: u32,
}

impl FactionAccount {
    pub fn with_stockpile(stockpile: Resources) -> Self {
        FactionAccount { stockpile, ..Default::default() }
    }

    /// Deducts `cost` if affordable. Leaves the account untouched otherwise.
    pub fn try_spend(&mut self, cost: &Resources) -> bool {
        match self.stockpile.checked_sub(cost) {
            Some(rest) => {
                self.stockpile = rest;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_requires_every_component() {
        let stock = Resources::new(100, 50, 0);
        assert!(stock.covers(&Resources::new(100, 50, 0)));
        assert!(!stock.covers(&Resources::new(10, 10, 1)));
    }

    #[test]
    fn try_spend_is_all_or_nothing() {
        let mut account = FactionAccount::with_stockpile(Resources::new(30, 30, 30));
        assert!(!account.try_spend(&Resources::new(10, 40, 0)));
        assert_eq!(account.stockpile, Resources::new(30, 30, 30));
        assert!(account.try_spend(&Resources::new(10, 20, 30)));
        assert_eq!(account.stockpile, Resources::new(20, 10, 0));
    }

    #[test]
    fn scaled_down_floors() {
        let refund = Resources::new(45, 21, 1).scaled_down(0.5);
        assert_eq!(refund, Resources::new(22, 10, 0));
    }

    #[test]
    fn add_saturates() {
        let sum = Resources::new(u32::MAX, 1, 2) + Resources::new(5, 1, 1);
        assert_eq!(sum, Resources::new(u32::MAX, 2, 3));
    }
}
