//! Conflict detection over a (possibly hand-edited) pairing sequence.

use std::collections::HashMap;

use crate::models::{Conflict, Pairing, TeamId};

/// Report every team that appears in more than one pairing.
///
/// Pure: the same input always gives the same output. Empty sides are skipped, so a
/// half-filled pairing is never a conflict on its own. A team on both sides of one
/// pairing counts once for that pairing; self-pairings are rejected when editing.
/// Conflicts come out in the order their team was first seen repeated; each lists all
/// of its pairing indices ascending.
pub fn detect_conflicts(pairings: &[Pairing]) -> Vec<Conflict> {
    let mut appearances: HashMap<TeamId, Vec<usize>> = HashMap::new();
    let mut repeated: Vec<TeamId> = Vec::new();

    for (index, pairing) in pairings.iter().enumerate() {
        for team_id in pairing.team_ids() {
            let indices = appearances.entry(team_id).or_default();
            if indices.last() == Some(&index) {
                continue;
            }
            indices.push(index);
            if indices.len() == 2 {
                repeated.push(team_id);
            }
        }
    }

    repeated
        .into_iter()
        .map(|team_id| Conflict {
            team_id,
            pairing_indices: appearances.remove(&team_id).unwrap_or_default(),
        })
        .collect()
}
