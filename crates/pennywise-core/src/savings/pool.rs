//! Price pool built from the comparison user's purchases

use std::collections::HashMap;

use serde::Serialize;

use super::normalize::normalize_item_name;
use crate::models::Transaction;

/// One observed price for an item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceObservation {
    pub merchant: String,
    pub location: Option<String>,
    pub unit_price: f64,
    pub total_price: f64,
    pub quantity: i64,
}

/// Normalized item name → every observed price, in load order
///
/// Keys iterate in first-insertion order and observations are never merged
/// or averaged, so "first seen" is well defined for tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct PricePool {
    entries: Vec<(String, Vec<PriceObservation>)>,
    index: HashMap<String, usize>,
}

impl PricePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from transactions already filtered by provenance
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut pool = Self::new();
        for tx in transactions {
            for item in &tx.items {
                pool.insert(
                    &item.name,
                    PriceObservation {
                        merchant: tx.merchant.clone(),
                        location: tx.location.clone(),
                        unit_price: item.unit_price,
                        total_price: item.total_price,
                        quantity: item.quantity,
                    },
                );
            }
        }
        pool
    }

    /// Record an observation under the normalized form of `name`
    ///
    /// Names that normalize to nothing are ignored.
    pub fn insert(&mut self, name: &str, observation: PriceObservation) {
        let key = normalize_item_name(name);
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx].1.push(observation),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![observation]));
            }
        }
    }

    /// Observations for an already normalized key
    pub fn get(&self, key: &str) -> Option<&[PriceObservation]> {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    /// Stored key and observations for an already normalized key
    pub fn entry(&self, key: &str) -> Option<(&str, &[PriceObservation])> {
        self.index.get(key).map(|&idx| {
            let (k, obs) = &self.entries[idx];
            (k.as_str(), obs.as_slice())
        })
    }

    /// Cheapest single observation for a key; the first one wins ties
    pub fn cheapest(&self, key: &str) -> Option<&PriceObservation> {
        self.get(key)?.iter().fold(None, |best, obs| match best {
            Some(b) if b.unit_price <= obs.unit_price => Some(b),
            _ => Some(obs),
        })
    }

    /// Keys and their observations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PriceObservation])> {
        self.entries
            .iter()
            .map(|(key, obs)| (key.as_str(), obs.as_slice()))
    }

    /// Number of distinct item keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total observations across all keys
    pub fn observation_count(&self) -> usize {
        self.entries.iter().map(|(_, obs)| obs.len()).sum()
    }
}
