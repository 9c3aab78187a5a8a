//! Parent-chain cycle detection

use std::collections::HashSet;

use crate::error::AppResult;
use crate::menu::repository::MenuRepository;
use crate::menu::MAX_WALK;

/// Would making `candidate_parent_id` the parent of `node_id` close a cycle?
///
/// Walks upward from the candidate through `parent_id` links. Reaching
/// `node_id` means yes; reaching a root means no. A chain that revisits a
/// node or exceeds `MAX_WALK` steps is already corrupted and is reported as
/// a cycle so the caller refuses the move.
pub async fn has_circular_reference<R>(
    repo: &R,
    node_id: i64,
    candidate_parent_id: i64,
) -> AppResult<bool>
where
    R: MenuRepository + ?Sized,
{
    let mut visited = HashSet::new();
    let mut current = Some(candidate_parent_id);

    while let Some(id) = current {
        if id == node_id {
            return Ok(true);
        }
        if !visited.insert(id) || visited.len() > MAX_WALK {
            tracing::warn!(
                "Parent chain of menu {} loops or is too deep, refusing to attach {}",
                candidate_parent_id,
                node_id
            );
            return Ok(true);
        }
        current = repo.find_by_id(id).await?.and_then(|menu| menu.parent_id);
    }

    Ok(false)
}
