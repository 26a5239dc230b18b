//! Optimal monotonic binning with weight-of-evidence encoding
//!
//! Categories are ordered by event rate and grouped into contiguous bins.
//! The search is a greedy merge over that ordering:
//!
//! 1. bins holding only events or only non-events merge into the neighbour
//!    with the closest event rate, so every WOE is finite
//! 2. bins below the minimum population merge the same way, smallest first
//! 3. neighbours with equal event rates merge, making the rate strictly
//!    increasing across bins
//! 4. while there are more than `max_n_bins` bins, the adjacent pair whose
//!    merge loses the least information value is merged
//!
//! Merging two neighbours yields an event rate between theirs, so the
//! ordering (and with it monotonic WOE) survives every step.

use super::config::{BinningConfig, UnknownCategoryPolicy};
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Score used for null cells and, under the neutral policy, unseen categories
pub const NEUTRAL_WOE: f64 = 0.0;

/// One fitted bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    /// Category values grouped in this bin, in event-rate order
    pub categories: Vec<String>,
    pub events: usize,
    pub non_events: usize,
    /// `ln(%non-event / %event)`
    pub woe: f64,
    /// `(%non-event - %event) * woe`
    pub iv: f64,
}

impl Bin {
    pub fn count(&self) -> usize {
        self.events + self.non_events
    }

    pub fn event_rate(&self) -> f64 {
        self.events as f64 / self.count() as f64
    }
}

/// Fitted per-column mapping from category to bin to WOE score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinningModel {
    column: String,
    bins: Vec<Bin>,
    lookup: BTreeMap<String, usize>,
    total_events: usize,
    total_non_events: usize,
}

impl BinningModel {
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Bins ordered by increasing event rate
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    pub fn total_events(&self) -> usize {
        self.total_events
    }

    pub fn total_non_events(&self) -> usize {
        self.total_non_events
    }

    /// Sum of the bins' IV contributions
    pub fn information_value(&self) -> f64 {
        self.bins.iter().map(|b| b.iv).sum()
    }

    pub fn bin_index(&self, category: &str) -> Option<usize> {
        self.lookup.get(category).copied()
    }

    pub fn woe_for(&self, category: &str) -> Option<f64> {
        self.bin_index(category).map(|i| self.bins[i].woe)
    }

    /// Replace each category by its WOE score
    ///
    /// Nulls map to [`NEUTRAL_WOE`]. Returns the scores and the number of
    /// unseen categories handled by `policy`.
    pub fn transform(
        &self,
        values: &[Option<String>],
        policy: UnknownCategoryPolicy,
    ) -> Result<(Vec<f64>, usize)> {
        let mut unseen = 0;
        let mut scores = Vec::with_capacity(values.len());
        for value in values {
            let score = match value {
                None => NEUTRAL_WOE,
                Some(category) => match self.woe_for(category) {
                    Some(woe) => woe,
                    None => match policy {
                        UnknownCategoryPolicy::Neutral => {
                            unseen += 1;
                            NEUTRAL_WOE
                        }
                        UnknownCategoryPolicy::Error => {
                            return Err(CatalogError::InvalidInput(format!(
                                "column '{}' has category '{}' unseen during fit",
                                self.column, category
                            )))
                        }
                    },
                },
            };
            scores.push(score);
        }
        Ok((scores, unseen))
    }
}

/// Working bin during the merge search
#[derive(Debug, Clone)]
struct Group {
    categories: Vec<String>,
    events: usize,
    non_events: usize,
}

impl Group {
    fn count(&self) -> usize {
        self.events + self.non_events
    }

    fn rate(&self) -> f64 {
        self.events as f64 / self.count() as f64
    }

    fn is_pure(&self) -> bool {
        self.events == 0 || self.non_events == 0
    }

    /// Exact event-rate comparison by cross multiplication
    fn cmp_rate(&self, other: &Group) -> Ordering {
        let lhs = self.events as u128 * other.count() as u128;
        let rhs = other.events as u128 * self.count() as u128;
        lhs.cmp(&rhs)
    }

    fn absorb(&mut self, other: Group) {
        self.categories.extend(other.categories);
        self.events += other.events;
        self.non_events += other.non_events;
    }

    fn woe(&self, total_events: usize, total_non_events: usize) -> f64 {
        let pe = self.events as f64 / total_events as f64;
        let pn = self.non_events as f64 / total_non_events as f64;
        (pn / pe).ln()
    }

    fn iv(&self, total_events: usize, total_non_events: usize) -> f64 {
        let pe = self.events as f64 / total_events as f64;
        let pn = self.non_events as f64 / total_non_events as f64;
        (pn - pe) * self.woe(total_events, total_non_events)
    }
}

/// Binning engine for one categorical column against a binary target
#[derive(Debug, Clone, Default)]
pub struct OptimalBinning {
    config: BinningConfig,
}

impl OptimalBinning {
    pub fn new(config: BinningConfig) -> Self {
        Self { config }
    }

    /// Fit a model; `target[i]` is true when row `i` is an event
    ///
    /// Rows with a null category stay out of the bins but count toward the
    /// event totals and the minimum bin population.
    pub fn fit(
        &self,
        column: &str,
        values: &[Option<String>],
        target: &[bool],
    ) -> Result<BinningModel> {
        if values.len() != target.len() {
            return Err(CatalogError::ShapeError {
                expected: format!("{} target values", values.len()),
                actual: format!("{}", target.len()),
            });
        }

        let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        let mut total_events = 0;
        for (value, &event) in values.iter().zip(target) {
            if event {
                total_events += 1;
            }
            if let Some(category) = value {
                let entry = counts.entry(category.as_str()).or_insert((0, 0));
                if event {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }
        let total_non_events = target.len() - total_events;
        if counts.len() < 2 {
            return Err(CatalogError::binning(
                column,
                format!("{} distinct non-null categories, need at least 2", counts.len()),
            ));
        }

        if total_events == 0 || total_non_events == 0 {
            return Err(CatalogError::binning(column, "target has a single class"));
        }

        let mut groups: Vec<Group> = counts
            .into_iter()
            .map(|(category, (events, non_events))| Group {
                categories: vec![category.to_string()],
                events,
                non_events,
            })
            .collect();
        groups.sort_by(|a, b| a.cmp_rate(b).then_with(|| a.categories.cmp(&b.categories)));

        let min_count = (self.config.min_bin_size * target.len() as f64).ceil() as usize;

        while let Some(i) = groups.iter().position(Group::is_pure) {
            if groups.len() < 2 {
                break;
            }
            merge_into_neighbour(&mut groups, i);
        }

        while groups.len() > 1 {
            let smallest = groups
                .iter()
                .enumerate()
                .filter(|(_, g)| g.count() < min_count)
                .min_by_key(|(i, g)| (g.count(), *i))
                .map(|(i, _)| i);
            match smallest {
                Some(i) => merge_into_neighbour(&mut groups, i),
                None => break,
            }
        }

        while let Some(i) = (1..groups.len())
            .find(|&i| groups[i - 1].cmp_rate(&groups[i]) == Ordering::Equal)
        {
            merge_pair(&mut groups, i - 1);
        }

        if let Some(max_n_bins) = self.config.max_n_bins {
            while groups.len() > max_n_bins.max(1) {
                let cheapest = (1..groups.len())
                    .map(|i| {
                        let before = groups[i - 1].iv(total_events, total_non_events)
                            + groups[i].iv(total_events, total_non_events);
                        let mut merged = groups[i - 1].clone();
                        merged.absorb(groups[i].clone());
                        (i, before - merged.iv(total_events, total_non_events))
                    })
                    .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
                    .map(|(i, _)| i);
                match cheapest {
                    Some(i) => merge_pair(&mut groups, i - 1),
                    None => break,
                }
            }
        }

        let mut lookup = BTreeMap::new();
        let bins: Vec<Bin> = groups
            .into_iter()
            .enumerate()
            .map(|(index, group)| {
                for category in &group.categories {
                    lookup.insert(category.clone(), index);
                }
                Bin {
                    woe: group.woe(total_events, total_non_events),
                    iv: group.iv(total_events, total_non_events),
                    categories: group.categories,
                    events: group.events,
                    non_events: group.non_events,
                }
            })
            .collect();

        if let Some(bad) = bins.iter().find(|b| !b.woe.is_finite()) {
            return Err(CatalogError::binning(
                column,
                format!("non-finite WOE for bin {:?}", bad.categories),
            ));
        }

        let model = BinningModel {
            column: column.to_string(),
            bins,
            lookup,
            total_events,
            total_non_events,
        };
        tracing::debug!(
            column,
            n_bins = model.n_bins(),
            iv = model.information_value(),
            "fitted binning model"
        );
        Ok(model)
    }
}

/// Merge bin `i` into whichever neighbour has the closer event rate
fn merge_into_neighbour(groups: &mut Vec<Group>, i: usize) {
    let has_left = i > 0;
    let has_right = i + 1 < groups.len();
    let left = match (has_left, has_right) {
        (true, true) => {
            let rate = groups[i].rate();
            (groups[i - 1].rate() - rate).abs() <= (groups[i + 1].rate() - rate).abs()
        }
        (true, false) => true,
        (false, true) => false,
        (false, false) => return,
    };
    if left {
        merge_pair(groups, i - 1);
    } else {
        merge_pair(groups, i);
    }
}

/// Merge bin `i + 1` into bin `i`
fn merge_pair(groups: &mut Vec<Group>, i: usize) {
    let right = groups.remove(i + 1);
    groups[i].absorb(right);
}
