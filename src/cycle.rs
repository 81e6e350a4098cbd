//! Acyclicity check for the filter-reference graph.
//!
//! Meant to run when a filter is created or updated, never during
//! evaluation. Only membership in the current DFS path is tracked; there is
//! no memo of fully checked filters, so a filter reachable through several
//! non-cyclic paths is fetched and walked once per path. Deep diamond-shaped
//! graphs therefore cost more than linear time.

use tracing::{trace, warn};

use crate::source::FilterRepository;
use crate::{Filter, FilterId, ValidationError};

/// Reject `filter` if following its filter references, transitively, can
/// lead back to a filter already on the current path.
///
/// `filter` itself is taken as given, so a not-yet-stored candidate can be
/// checked; the filters it references are fetched from `repository`.
///
/// # Errors
///
/// [`ValidationError::CycleDetected`] with the offending path (its last id
/// repeats an earlier one), [`ValidationError::FilterNotFound`] for a
/// dangling reference, or the repository's own failure.
pub fn check_no_cycle(
    filter: &Filter,
    repository: &dyn FilterRepository,
) -> Result<(), ValidationError> {
    let mut path = Vec::new();
    visit(filter, repository, &mut path)
}

fn visit(
    filter: &Filter,
    repository: &dyn FilterRepository,
    path: &mut Vec<FilterId>,
) -> Result<(), ValidationError> {
    trace!(filter_id = %filter.id, depth = path.len(), "visiting filter");
    path.push(filter.id);
    for id in filter.referenced_filters() {
        if path.contains(&id) {
            let mut cycle = path.clone();
            cycle.push(id);
            warn!(filter_id = %id, length = cycle.len(), "cyclic filter reference");
            return Err(ValidationError::CycleDetected { path: cycle });
        }
        let referenced = repository
            .get_filter(id)
            .map_err(ValidationError::Repository)?
            .ok_or(ValidationError::FilterNotFound { id })?;
        visit(&referenced, repository, path)?;
    }
    path.pop();
    Ok(())
}
