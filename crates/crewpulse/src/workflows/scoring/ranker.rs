use std::cmp::Ordering;
use std::collections::HashMap;

use super::domain::{LocationId, MonthlyScoreSnapshot};

/// Assign `rank_in_location` within each location: scored employees only,
/// effective score descending, positional ranks 1..N. The sort is stable so
/// ties keep their encounter order rather than sharing a rank. Employees
/// without a location or without a score are left unranked.
pub(crate) fn assign_location_ranks(rows: &mut [MonthlyScoreSnapshot]) {
    let mut groups: HashMap<LocationId, Vec<usize>> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        if row.effective_score.is_none() {
            continue;
        }
        if let Some(location) = &row.location {
            groups.entry(location.clone()).or_default().push(index);
        }
    }

    for indices in groups.values_mut() {
        indices.sort_by(|&a, &b| {
            let left = rows[a].effective_score.unwrap_or(0.0);
            let right = rows[b].effective_score.unwrap_or(0.0);
            right.partial_cmp(&left).unwrap_or(Ordering::Equal)
        });

        for (position, &index) in indices.iter().enumerate() {
            rows[index].rank_in_location = Some(position as u32 + 1);
        }
    }
}
