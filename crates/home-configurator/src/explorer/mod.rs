//! Price-Range Explorer: brute-forces the minimum and maximum achievable
//! price of every choice over the legal on/off combinations of its
//! relevant-choice closure. Combinatorial by nature — run it through
//! [`PriceRangeWorker`] off the interactive path, never per keystroke.

mod closure;
mod config;
mod search;
mod worker;

pub use closure::relevant_choices;
pub use config::ExplorerConfig;
pub use worker::{ExplorerError, PriceRangeWorker};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::apply_rules;
use crate::rules::{PlanOption, TreeVersionRules};
use crate::tree::Tree;

/// Deep-copyable request message: the explorer owns its copy exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRangeRequest {
    pub tree: Tree,
    pub rules: TreeVersionRules,
    pub options: Vec<PlanOption>,
}

/// Observed price band for one choice across every legal combination of its
/// dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChoicePriceRange {
    pub choice_id: u32,
    pub min: f64,
    pub max: f64,
}

/// Computes the price range of every choice in the request's tree. For a
/// choice with no relevant dependencies, one baseline engine pass supplies
/// both bounds; otherwise each surviving assignment of the closure gets a
/// fresh reset, the assignment applied, and a full engine pass, folding the
/// choice's price into the running min/max whenever the choice and its point
/// come out enabled.
pub fn choice_price_ranges(
    request: &PriceRangeRequest,
    config: &ExplorerConfig,
) -> Vec<ChoicePriceRange> {
    let mut baseline = request.tree.clone();
    for choice in baseline.tree_version.choices_mut() {
        choice.quantity = 0;
    }
    apply_rules(&mut baseline, &request.rules, &request.options, None, &[]);

    let subject_ids: Vec<u32> = request.tree.tree_version.choices().map(|c| c.id).collect();
    debug!(choices = subject_ids.len(), "exploring price ranges");

    let mut ranges = Vec::with_capacity(subject_ids.len());
    for subject_id in subject_ids {
        let baseline_price = baseline
            .tree_version
            .find_choice(subject_id)
            .map(|choice| choice.price)
            .unwrap_or(0.0);

        let closure =
            closure::relevant_choices(&request.tree.tree_version, &request.rules, subject_id);
        if closure.is_empty() {
            ranges.push(ChoicePriceRange {
                choice_id: subject_id,
                min: baseline_price,
                max: baseline_price,
            });
            continue;
        }
        if closure.len() > config.closure_warn_threshold {
            warn!(
                choice = subject_id,
                closure = closure.len(),
                "large relevant-choice closure, enumeration may be slow"
            );
        }

        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        search::for_each_legal_assignment(
            &request.tree.tree_version,
            &request.rules,
            &closure,
            |assignment| {
                let mut work = request.tree.clone();
                for choice in work.tree_version.choices_mut() {
                    choice.quantity = 0;
                    choice.enabled = true;
                }
                for (&id, &selected) in assignment {
                    if selected {
                        if let Some(choice) = work.tree_version.find_choice_mut(id) {
                            choice.quantity = 1;
                        }
                    }
                }
                apply_rules(&mut work, &request.rules, &request.options, None, &[]);

                let Some(choice) = work.tree_version.find_choice(subject_id) else {
                    return;
                };
                let point_enabled = work
                    .tree_version
                    .point_containing_choice(subject_id)
                    .map(|point| point.enabled)
                    .unwrap_or(false);
                if choice.enabled && point_enabled {
                    min = Some(min.map_or(choice.price, |current: f64| current.min(choice.price)));
                    max = Some(max.map_or(choice.price, |current: f64| current.max(choice.price)));
                }
            },
        );

        // Every legal combination left the choice disabled; fall back to the
        // baseline price the way the empty closure does.
        let (min, max) = match (min, max) {
            (Some(min), Some(max)) => (min, max),
            _ => (baseline_price, baseline_price),
        };
        ranges.push(ChoicePriceRange {
            choice_id: subject_id,
            min,
            max,
        });
    }
    ranges
}
