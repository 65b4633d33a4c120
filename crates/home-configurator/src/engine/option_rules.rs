use std::collections::HashSet;

use tracing::trace;

use crate::rules::{OptionMapping, OptionRule, PlanOption, TimeOfSaleOptionPrice, TreeVersionRules};
use crate::tree::{max_sort_order_choice, AttachedOption, Tree, TreeVersion};

/// An attribute group moved between choices by a satisfied option mapping.
/// `from_choice_id` is the tree id of the choice carrying the option;
/// `to_choice_id` is the raw catalog reference of the receiving choice.
pub(super) struct ActiveReassignment {
    pub from_choice_id: u32,
    pub to_choice_id: u32,
    pub attribute_group_id: u32,
}

/// Step 7: evaluate option rules, replaced options first so a replacement
/// delta always subtracts a known price. Attaches each satisfied option to
/// the max-sort-order choice of its mapping and accumulates that choice's
/// price; the first satisfied mapping in declaration order wins.
pub(super) fn evaluate(
    tree: &mut Tree,
    rules: &TreeVersionRules,
    options: &[PlanOption],
    historical_prices: &[TimeOfSaleOptionPrice],
) -> Vec<ActiveReassignment> {
    let mut executed = HashSet::new();
    let mut reassignments = Vec::new();
    for rule in &rules.option_rules {
        execute(
            tree,
            rules,
            options,
            historical_prices,
            rule,
            &mut executed,
            &mut reassignments,
        );
    }
    reassignments
}

#[allow(clippy::too_many_arguments)]
fn execute(
    tree: &mut Tree,
    rules: &TreeVersionRules,
    options: &[PlanOption],
    historical_prices: &[TimeOfSaleOptionPrice],
    rule: &OptionRule,
    executed: &mut HashSet<u32>,
    reassignments: &mut Vec<ActiveReassignment>,
) {
    if !executed.insert(rule.id) {
        return;
    }

    for replaced_key in &rule.replace_options {
        let replaced_rule = rules
            .option_rules
            .iter()
            .find(|candidate| &candidate.option_id == replaced_key);
        if let Some(replaced_rule) = replaced_rule {
            execute(
                tree,
                rules,
                options,
                historical_prices,
                replaced_rule,
                executed,
                reassignments,
            );
        }
    }

    let Some(option) = options
        .iter()
        .find(|option| option.integration_key == rule.option_id)
    else {
        return;
    };

    for mapping in &rule.option_mappings {
        let must_have: Vec<u32> = mapping
            .choices
            .iter()
            .filter(|choice| choice.must_have)
            .map(|choice| choice.id)
            .collect();
        let Some(pivot) = max_sort_order_choice(&tree.tree_version, &must_have) else {
            continue;
        };
        if pivot.tree_version_id != tree.tree_version.id {
            continue;
        }
        let pivot_id = pivot.id;
        let pivot_catalog_id = pivot.div_choice_catalog_id;

        if !mapping_satisfied(&tree.tree_version, mapping, pivot_id) {
            continue;
        }

        let calculated = if option.max_order_quantity > 1 {
            option.list_price
        } else {
            single_quantity_price(
                &tree.tree_version,
                options,
                historical_prices,
                rule,
                option,
                pivot_catalog_id,
            )
        };

        // The replacement supersedes: the replaced options leave whichever
        // choices carried them before the delta-priced option lands.
        for replaced_key in &rule.replace_options {
            strip_option(&mut tree.tree_version, replaced_key);
        }

        let Some(choice) = tree.tree_version.find_choice_mut(pivot_id) else {
            continue;
        };
        choice.options.push(AttachedOption {
            integration_key: option.integration_key.clone(),
            list_price: option.list_price,
            calculated_price: calculated,
            max_order_quantity: option.max_order_quantity,
            attribute_groups: option.attribute_groups.clone(),
            location_groups: option.location_groups.clone(),
            is_base_house: option.is_base_house,
        });
        choice.price += calculated;
        if option.max_order_quantity > 1 {
            let cap = choice.choice_max_quantity.unwrap_or(option.max_order_quantity);
            choice.max_quantity = option.max_order_quantity.min(cap).max(1);
            choice.quantity = choice.quantity.min(choice.max_quantity);
        }

        for mapping_choice in &mapping.choices {
            for reassignment in &mapping_choice.attribute_reassignments {
                reassignments.push(ActiveReassignment {
                    from_choice_id: pivot_id,
                    to_choice_id: reassignment.to_choice_id,
                    attribute_group_id: reassignment.attribute_group_id,
                });
            }
        }

        trace!(
            option = %rule.option_id,
            choice = pivot_id,
            price = calculated,
            "option attached"
        );
        break;
    }
}

/// A mapping holds when every listed choice matches its flag — selected for
/// must-have, deselected for must-not-have — except the pivot itself, which
/// carries the option (and its price preview) before the buyer commits.
fn mapping_satisfied(tree: &TreeVersion, mapping: &OptionMapping, pivot_id: u32) -> bool {
    mapping.choices.iter().all(|mapping_choice| {
        match tree.find_choice_by_any_id(mapping_choice.id) {
            None => false,
            Some(choice) if choice.id == pivot_id => true,
            Some(choice) => {
                if mapping_choice.must_have {
                    choice.quantity > 0
                } else {
                    choice.quantity == 0
                }
            }
        }
    })
}

/// Base price adjusted for a replace chain: the delta over every replaced
/// option still attached, with time-of-sale records preserving original
/// pricing for contracted choices.
fn single_quantity_price(
    tree: &TreeVersion,
    options: &[PlanOption],
    historical_prices: &[TimeOfSaleOptionPrice],
    rule: &OptionRule,
    option: &PlanOption,
    pivot_catalog_id: u32,
) -> f64 {
    let replace_chain_active = !rule.replace_options.is_empty();

    let mut price = if replace_chain_active {
        time_of_sale_price(historical_prices, option.id, pivot_catalog_id)
            .unwrap_or(option.list_price)
    } else {
        option.list_price
    };

    for replaced_key in &rule.replace_options {
        let Some((carrier_catalog_id, attached)) = attached_price(tree, replaced_key) else {
            continue;
        };
        let replaced_option_id = options
            .iter()
            .find(|candidate| &candidate.integration_key == replaced_key)
            .map(|candidate| candidate.id);
        let subtracted = replaced_option_id
            .and_then(|id| time_of_sale_price(historical_prices, id, carrier_catalog_id))
            .unwrap_or(attached);
        price -= subtracted;
    }

    price
}

fn time_of_sale_price(
    historical_prices: &[TimeOfSaleOptionPrice],
    plan_option_id: u32,
    div_choice_catalog_id: u32,
) -> Option<f64> {
    historical_prices
        .iter()
        .find(|record| {
            record.plan_option_id == plan_option_id
                && record.div_choice_catalog_id == div_choice_catalog_id
        })
        .map(|record| record.list_price)
}

/// The catalog id of the choice currently carrying the option, and the price
/// it was attached at.
fn attached_price(tree: &TreeVersion, integration_key: &str) -> Option<(u32, f64)> {
    tree.choices().find_map(|choice| {
        choice
            .options
            .iter()
            .find(|attached| attached.integration_key == integration_key)
            .map(|attached| (choice.div_choice_catalog_id, attached.calculated_price))
    })
}

fn strip_option(tree: &mut TreeVersion, integration_key: &str) {
    for choice in tree.choices_mut() {
        if let Some(position) = choice
            .options
            .iter()
            .position(|attached| attached.integration_key == integration_key)
        {
            let removed = choice.options.remove(position);
            choice.price -= removed.calculated_price;
        }
    }
}
