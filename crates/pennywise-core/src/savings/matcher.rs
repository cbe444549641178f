//! Two-pass item matcher
//!
//! An item is matched against the pool by exact normalized name first. Only
//! when no exact observation is strictly cheaper does the fuzzy pass run,
//! scanning every pool key for token overlap. Within a pass the largest
//! saving wins and the first-seen observation wins exact ties.

use serde::{Deserialize, Serialize};

use super::normalize::{names_overlap, normalize_item_name};
use super::pool::{PriceObservation, PricePool};
use super::{round1, round2};
use crate::models::{LineItem, NewLineItem};

/// A purchased line as seen by the matcher
#[derive(Debug, Clone, PartialEq)]
pub struct PurchasedItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

impl PurchasedItem {
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            total_price: unit_price * quantity as f64,
        }
    }
}

impl From<&LineItem> for PurchasedItem {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        }
    }
}

impl From<&NewLineItem> for PurchasedItem {
    fn from(item: &NewLineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.resolved_total(),
        }
    }
}

/// Which pass produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

/// A purchased item with a strictly cheaper comparison price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedItem {
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    /// Pool key the observation was found under
    pub matched_name: String,
    pub match_kind: MatchKind,
    pub merchant: String,
    pub location: Option<String>,
    pub alternative_unit_price: f64,
    /// Observed unit price times the purchased quantity
    pub alternative_total_price: f64,
    pub savings: f64,
    /// Savings as a share of the paid total, one decimal
    pub savings_percent: f64,
}

struct Candidate<'a> {
    key: &'a str,
    observation: &'a PriceObservation,
    savings: f64,
}

/// Raise `best` if any observation beats it; equal savings keep the earlier one
fn scan<'a>(
    key: &'a str,
    observations: &'a [PriceObservation],
    item: &PurchasedItem,
    best: &mut Option<Candidate<'a>>,
) {
    let quantity = item.quantity as f64;
    for observation in observations {
        let savings = (item.unit_price - observation.unit_price) * quantity;
        if savings <= 0.0 {
            continue;
        }
        if best.as_ref().map_or(true, |b| savings > b.savings) {
            *best = Some(Candidate {
                key,
                observation,
                savings,
            });
        }
    }
}

/// Find the largest saving for one purchased item
///
/// Returns `None` when no observation in either pass is strictly cheaper.
pub fn match_item(pool: &PricePool, item: &PurchasedItem) -> Option<MatchedItem> {
    let key = normalize_item_name(&item.name);
    if key.is_empty() || item.quantity < 1 {
        return None;
    }

    let mut best = None;
    if let Some((pool_key, observations)) = pool.entry(&key) {
        scan(pool_key, observations, item, &mut best);
    }
    if let Some(candidate) = best.take() {
        return Some(build_match(item, candidate, MatchKind::Exact));
    }

    for (pool_key, observations) in pool.iter() {
        if names_overlap(&key, pool_key) {
            scan(pool_key, observations, item, &mut best);
        }
    }
    best.map(|candidate| build_match(item, candidate, MatchKind::Fuzzy))
}

fn build_match(item: &PurchasedItem, candidate: Candidate<'_>, kind: MatchKind) -> MatchedItem {
    let obs = candidate.observation;
    let savings_percent = if item.total_price > 0.0 {
        round1(candidate.savings / item.total_price * 100.0)
    } else {
        0.0
    };

    MatchedItem {
        item_name: item.name.clone(),
        quantity: item.quantity,
        unit_price: item.unit_price,
        total_price: round2(item.total_price),
        matched_name: candidate.key.to_string(),
        match_kind: kind,
        merchant: obs.merchant.clone(),
        location: obs.location.clone(),
        alternative_unit_price: obs.unit_price,
        alternative_total_price: round2(obs.unit_price * item.quantity as f64),
        savings: round2(candidate.savings),
        savings_percent,
    }
}
