//! Read-side helpers over a list of spools: search, stock levels and totals.

use std::fmt;

use crate::model::Spool;

/// Below this many grams a spool is low on stock
pub const LOW_STOCK_GRAMS: f64 = 100.0;
/// Below this many grams a spool is running down
pub const MEDIUM_STOCK_GRAMS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    Low,
    Medium,
    Healthy,
}

impl StockLevel {
    pub fn for_weight(weight: f64) -> Self {
        if weight < LOW_STOCK_GRAMS {
            StockLevel::Low
        } else if weight < MEDIUM_STOCK_GRAMS {
            StockLevel::Medium
        } else {
            StockLevel::Healthy
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockLevel::Low => f.write_str("low"),
            StockLevel::Medium => f.write_str("medium"),
            StockLevel::Healthy => f.write_str("ok"),
        }
    }
}

impl Spool {
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::for_weight(self.weight)
    }

    /// Case-insensitive substring match on brand, color or material.
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.brand.to_lowercase().contains(&needle)
            || self.color.to_lowercase().contains(&needle)
            || self.material.as_str().to_lowercase().contains(&needle)
    }
}

pub fn search<'a>(spools: &'a [Spool], query: &str) -> Vec<&'a Spool> {
    spools.iter().filter(|s| s.matches_query(query)).collect()
}

/// Totals across a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventorySummary {
    pub spool_count: usize,
    pub total_cost: f64,
    /// Sum of non-negative current weights
    pub total_remaining_grams: f64,
    pub low_stock_count: usize,
}

impl InventorySummary {
    pub fn from_spools<'a>(spools: impl IntoIterator<Item = &'a Spool>) -> Self {
        spools.into_iter().fold(Self::default(), |mut acc, spool| {
            acc.spool_count += 1;
            acc.total_cost += spool.cost;
            acc.total_remaining_grams += spool.weight.max(0.0);
            if spool.stock_level() == StockLevel::Low {
                acc.low_stock_count += 1;
            }
            acc
        })
    }
}
