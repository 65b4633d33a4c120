use super::domain::{CompletionStatus, DecisionPoint, Group, SubGroup, Tree};

/// Derives a point's completion status from its own flags and the contained
/// choices. Pure and order independent; called bottom-up after engine passes.
pub fn point_status(point: &DecisionPoint) -> CompletionStatus {
    let selected: Vec<_> = point
        .choices
        .iter()
        .filter(|choice| choice.quantity > 0)
        .collect();

    // A selected-but-disabled choice is a grandfathered lock-in surfaced to
    // the buyer, as is an exclusive point with competing locked selections.
    let disabled_selection = selected.iter().any(|choice| !choice.enabled);
    if disabled_selection || (point.pick_type.is_exclusive() && selected.len() > 1) {
        return CompletionStatus::Conflicted;
    }

    if !selected.is_empty() {
        if selected.iter().all(|choice| choice.attributes_complete()) {
            return CompletionStatus::Completed;
        }
        return CompletionStatus::PartiallyCompleted;
    }

    if point.enabled && point.pick_type.requires_selection() {
        return CompletionStatus::Required;
    }

    if point.viewed {
        CompletionStatus::Viewed
    } else {
        CompletionStatus::Unviewed
    }
}

const ROLLUP_PRECEDENCE: [CompletionStatus; 5] = [
    CompletionStatus::Conflicted,
    CompletionStatus::Required,
    CompletionStatus::PartiallyCompleted,
    CompletionStatus::Completed,
    CompletionStatus::Viewed,
];

fn rollup<I: Iterator<Item = CompletionStatus> + Clone>(children: I) -> CompletionStatus {
    for status in ROLLUP_PRECEDENCE {
        if children.clone().any(|child| child == status) {
            return status;
        }
    }
    CompletionStatus::Unviewed
}

/// Rolls the contained point statuses up by precedence, most restrictive
/// first. Disabled points do not participate.
pub fn subgroup_status(sub_group: &SubGroup) -> CompletionStatus {
    rollup(
        sub_group
            .points
            .iter()
            .filter(|point| point.enabled)
            .map(|point| point.status),
    )
}

pub fn group_status(group: &Group) -> CompletionStatus {
    rollup(group.sub_groups.iter().map(|sub_group| sub_group.status))
}

/// Recomputes every status in the tree bottom-up: points from their choices,
/// then subgroups, then groups.
pub fn refresh_statuses(tree: &mut Tree) {
    for group in &mut tree.tree_version.groups {
        for sub_group in &mut group.sub_groups {
            for point in &mut sub_group.points {
                point.status = point_status(point);
            }
            sub_group.status = subgroup_status(sub_group);
        }
        group.status = group_status(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::domain::{Choice, DecisionPoint, MappedGroup, PickType, SelectedAttribute};

    fn point_with(pick_type: PickType, choices: Vec<Choice>) -> DecisionPoint {
        let mut point = DecisionPoint::new(1, 9001, 1, 1, "fixture", pick_type);
        point.choices = choices;
        point
    }

    fn selected_choice(id: u32) -> Choice {
        let mut choice = Choice::new(id, id + 1000, 1, id as i32, "fixture");
        choice.quantity = 1;
        choice
    }

    #[test]
    fn empty_required_point_reports_required() {
        let point = point_with(PickType::Pick1, vec![Choice::new(1, 1001, 1, 1, "a")]);
        assert_eq!(point_status(&point), CompletionStatus::Required);
    }

    #[test]
    fn optional_point_tracks_the_viewed_flag() {
        let mut point = point_with(PickType::Pick0or1, vec![Choice::new(1, 1001, 1, 1, "a")]);
        assert_eq!(point_status(&point), CompletionStatus::Unviewed);
        point.viewed = true;
        assert_eq!(point_status(&point), CompletionStatus::Viewed);
    }

    #[test]
    fn selection_with_open_attributes_is_partially_completed() {
        let mut choice = selected_choice(1);
        choice.mapped_attribute_groups = vec![MappedGroup::catalog(10)];
        let point = point_with(PickType::Pick1, vec![choice]);
        assert_eq!(point_status(&point), CompletionStatus::PartiallyCompleted);
    }

    #[test]
    fn selection_with_covered_attributes_is_completed() {
        let mut choice = selected_choice(1);
        choice.mapped_attribute_groups = vec![MappedGroup::catalog(10)];
        choice.selected_attributes = vec![SelectedAttribute {
            attribute_group_id: Some(10),
            location_group_id: None,
            attribute_id: Some(1000),
            location_id: None,
            quantity: 1,
        }];
        let point = point_with(PickType::Pick1, vec![choice]);
        assert_eq!(point_status(&point), CompletionStatus::Completed);
    }

    #[test]
    fn double_selection_in_an_exclusive_point_conflicts() {
        let point = point_with(
            PickType::Pick0or1,
            vec![selected_choice(1), selected_choice(2)],
        );
        assert_eq!(point_status(&point), CompletionStatus::Conflicted);
    }

    #[test]
    fn disabled_selection_conflicts() {
        let mut choice = selected_choice(1);
        choice.enabled = false;
        let point = point_with(PickType::Pick0orMore, vec![choice]);
        assert_eq!(point_status(&point), CompletionStatus::Conflicted);
    }

    #[test]
    fn rollup_prefers_the_most_restrictive_child() {
        let completed = {
            let mut point = point_with(PickType::Pick0or1, vec![selected_choice(1)]);
            point.status = point_status(&point);
            point
        };
        let required = {
            let mut point = point_with(PickType::Pick1, vec![Choice::new(2, 1002, 1, 1, "b")]);
            point.id = 2;
            point.status = point_status(&point);
            point
        };
        let sub_group = crate::tree::domain::SubGroup {
            id: 1,
            sort_order: 1,
            label: "fixture".to_string(),
            status: CompletionStatus::Unviewed,
            points: vec![completed, required],
        };
        assert_eq!(subgroup_status(&sub_group), CompletionStatus::Required);
    }

    #[test]
    fn disabled_points_do_not_drag_the_rollup() {
        let mut disabled = point_with(PickType::Pick1, vec![Choice::new(1, 1001, 1, 1, "a")]);
        disabled.enabled = false;
        disabled.status = CompletionStatus::Required;
        let sub_group = crate::tree::domain::SubGroup {
            id: 1,
            sort_order: 1,
            label: "fixture".to_string(),
            status: CompletionStatus::Unviewed,
            points: vec![disabled],
        };
        assert_eq!(subgroup_status(&sub_group), CompletionStatus::Unviewed);
    }
}
