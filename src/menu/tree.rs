//! Tree assembly from flat menu lists
//!
//! Everything here works on ids and index maps; nodes never hold references
//! to their parents.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::entity::menu;
use crate::menu::dto::MenuResponse;

/// Map-based single-pass assembly.
///
/// Builds an id -> slot map, then attaches each node to its parent's
/// children, or to the root list when it has no parent or the parent is not
/// part of `menus`. Input order is kept within each sibling list and
/// repeated ids keep their first occurrence. Nodes on a parent cycle are
/// left out with a warning.
pub fn build_tree(menus: Vec<menu::Model>) -> Vec<MenuResponse> {
    let mut slots: Vec<Option<MenuResponse>> = Vec::with_capacity(menus.len());
    let mut parents: Vec<Option<i64>> = Vec::with_capacity(menus.len());
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(menus.len());

    for menu in menus {
        if index.contains_key(&menu.id) {
            continue;
        }
        index.insert(menu.id, slots.len());
        parents.push(menu.parent_id);
        slots.push(Some(MenuResponse::from(menu)));
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    let mut roots = Vec::new();
    for (slot, parent_id) in parents.iter().enumerate() {
        match parent_id.and_then(|pid| index.get(&pid).copied()) {
            Some(parent_slot) if parent_slot != slot => children[parent_slot].push(slot),
            _ => roots.push(slot),
        }
    }

    let tree = roots
        .into_iter()
        .filter_map(|slot| assemble(slot, &mut slots, &children))
        .collect();

    // nodes on a parent cycle are unreachable from any root
    let dropped: Vec<i64> = slots.iter().flatten().map(|node| node.id).collect();
    if !dropped.is_empty() {
        tracing::warn!("Menus {:?} sit on a parent cycle and were left out of the tree", dropped);
    }
    tree
}

fn assemble(
    slot: usize,
    slots: &mut [Option<MenuResponse>],
    children: &[Vec<usize>],
) -> Option<MenuResponse> {
    let mut node = slots[slot].take()?;
    node.children = children[slot]
        .iter()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    node.has_children = !node.children.is_empty();
    Some(node)
}

/// parent id -> child ids, in input order
pub fn children_index(menus: &[menu::Model]) -> HashMap<i64, Vec<i64>> {
    let mut children_of: HashMap<i64, Vec<i64>> = HashMap::new();
    for menu in menus {
        if let Some(parent_id) = menu.parent_id {
            children_of.entry(parent_id).or_default().push(menu.id);
        }
    }
    children_of
}

/// `root_id` and all of its descendants, deepest first, `root_id` last
pub fn collect_subtree(children_of: &HashMap<i64, Vec<i64>>, root_id: i64) -> Vec<i64> {
    let mut order = Vec::new();
    let mut visited = HashSet::from([root_id]);
    let mut stack = vec![(root_id, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        stack.push((id, true));
        if let Some(kids) = children_of.get(&id) {
            for &kid in kids.iter().rev() {
                if visited.insert(kid) {
                    stack.push((kid, false));
                }
            }
        }
    }

    order
}

/// New `(id, level)` of every descendant once `root_id` sits at `root_level`
pub fn relevel_descendants(
    children_of: &HashMap<i64, Vec<i64>>,
    root_id: i64,
    root_level: i32,
) -> Vec<(i64, i32)> {
    let mut levels = Vec::new();
    let mut visited = HashSet::from([root_id]);
    let mut queue = VecDeque::from([(root_id, root_level)]);

    while let Some((id, level)) = queue.pop_front() {
        let Some(kids) = children_of.get(&id) else {
            continue;
        };
        for &kid in kids {
            if visited.insert(kid) {
                levels.push((kid, level + 1));
                queue.push_back((kid, level + 1));
            }
        }
    }

    levels
}
