use chrono::NaiveDate;

use super::domain::{Choice, DecisionPoint, Tree, TreeError, TreeVersion};

impl TreeVersion {
    pub fn points(&self) -> impl Iterator<Item = &DecisionPoint> {
        self.groups
            .iter()
            .flat_map(|group| group.sub_groups.iter())
            .flat_map(|sub_group| sub_group.points.iter())
    }

    pub fn points_mut(&mut self) -> impl Iterator<Item = &mut DecisionPoint> {
        self.groups
            .iter_mut()
            .flat_map(|group| group.sub_groups.iter_mut())
            .flat_map(|sub_group| sub_group.points.iter_mut())
    }

    pub fn choices(&self) -> impl Iterator<Item = &Choice> {
        self.points().flat_map(|point| point.choices.iter())
    }

    pub fn choices_mut(&mut self) -> impl Iterator<Item = &mut Choice> {
        self.points_mut().flat_map(|point| point.choices.iter_mut())
    }

    pub fn find_point(&self, point_id: u32) -> Option<&DecisionPoint> {
        self.points().find(|point| point.id == point_id)
    }

    pub fn find_point_mut(&mut self, point_id: u32) -> Option<&mut DecisionPoint> {
        self.points_mut().find(|point| point.id == point_id)
    }

    pub fn find_choice(&self, choice_id: u32) -> Option<&Choice> {
        self.choices().find(|choice| choice.id == choice_id)
    }

    pub fn find_choice_mut(&mut self, choice_id: u32) -> Option<&mut Choice> {
        self.choices_mut().find(|choice| choice.id == choice_id)
    }

    /// Resolves a reference that may carry either the tree-instance id or the
    /// catalog id. Tree ids win when both spaces collide.
    pub fn find_choice_by_any_id(&self, id: u32) -> Option<&Choice> {
        self.find_choice(id)
            .or_else(|| self.choices().find(|choice| choice.div_choice_catalog_id == id))
    }

    pub fn find_choice_by_any_id_mut(&mut self, id: u32) -> Option<&mut Choice> {
        if self.find_choice(id).is_some() {
            return self.find_choice_mut(id);
        }
        self.choices_mut()
            .find(|choice| choice.div_choice_catalog_id == id)
    }

    /// The decision point holding the given choice (by tree id).
    pub fn point_containing_choice(&self, choice_id: u32) -> Option<&DecisionPoint> {
        self.points()
            .find(|point| point.choices.iter().any(|choice| choice.id == choice_id))
    }

    pub fn point_containing_choice_mut(&mut self, choice_id: u32) -> Option<&mut DecisionPoint> {
        self.points_mut()
            .find(|point| point.choices.iter().any(|choice| choice.id == choice_id))
    }
}

/// Of the referenced choices, the one sorting last in tree order (group,
/// subgroup, point, choice sort order, each ascending) — the decision lowest
/// in the visual tree, which conventionally owns a jointly-enabled option's
/// price. References may use tree ids or catalog ids.
pub fn max_sort_order_choice<'a>(tree: &'a TreeVersion, choice_ids: &[u32]) -> Option<&'a Choice> {
    let mut best: Option<((i32, i32, i32, i32), &Choice)> = None;

    for group in &tree.groups {
        for sub_group in &group.sub_groups {
            for point in &sub_group.points {
                for choice in &point.choices {
                    let referenced = choice_ids
                        .iter()
                        .any(|&id| id == choice.id || id == choice.div_choice_catalog_id);
                    if !referenced {
                        continue;
                    }
                    let key = (
                        group.sort_order,
                        sub_group.sort_order,
                        point.sort_order,
                        choice.sort_order,
                    );
                    if best.map(|(current, _)| key >= current).unwrap_or(true) {
                        best = Some((key, choice));
                    }
                }
            }
        }
    }

    best.map(|(_, choice)| choice)
}

/// Sets a choice's quantity, clamping to `max_quantity` and zeroing siblings
/// within Pick1/Pick0or1 points. Selecting a disabled choice is rejected;
/// deselecting always succeeds.
pub fn select_choice(
    tree: &mut TreeVersion,
    choice_id: u32,
    quantity: u32,
) -> Result<(), TreeError> {
    let point = tree
        .point_containing_choice_mut(choice_id)
        .ok_or(TreeError::ChoiceNotFound(choice_id))?;
    let exclusive = point.pick_type.is_exclusive();

    let position = point
        .choices
        .iter()
        .position(|choice| choice.id == choice_id)
        .ok_or(TreeError::ChoiceNotFound(choice_id))?;
    let target = &point.choices[position];
    if quantity > 0 && !(target.enabled && target.is_selectable) {
        return Err(TreeError::ChoiceDisabled(choice_id));
    }

    if exclusive && quantity > 0 {
        for (index, sibling) in point.choices.iter_mut().enumerate() {
            if index != position {
                sibling.quantity = 0;
            }
        }
    }

    let choice = &mut point.choices[position];
    choice.quantity = quantity.min(choice.max_quantity);
    Ok(())
}

/// Total configured price: every selected choice's price times its quantity.
pub fn tree_price(tree: &Tree) -> f64 {
    tree.tree_version
        .choices()
        .map(|choice| choice.price * f64::from(choice.quantity))
        .sum()
}

/// Recomputes each point's `is_past_cut_off` from its cut-off date. The
/// caller supplies the date so passes stay deterministic.
pub fn refresh_cut_offs(tree: &mut Tree, today: NaiveDate) {
    for point in tree.tree_version.points_mut() {
        point.is_past_cut_off = point
            .cut_off_date
            .map(|cut_off| cut_off < today)
            .unwrap_or(false);
    }
}
