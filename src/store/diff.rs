//! Identity diffing between what is stored and what should be stored.
//!
//! Items are matched by an equality predicate, never by position, so a
//! reordered or partially overlapping list only touches the items that
//! actually differ.

/// Result of [`diff_by`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff<'a, D> {
    /// Indices into `current` with no counterpart in `desired`.
    pub remove: Vec<usize>,
    /// Items of `desired` with no counterpart in `current`.
    pub insert: Vec<&'a D>,
    /// Number of `current` items that stay as they are.
    pub unchanged: usize,
}

impl<D> Diff<'_, D> {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.insert.is_empty()
    }
}

/// Compute the removals and insertions that turn `current` into `desired`
/// under the identity `same`.
///
/// Each desired item claims at most one current item, so duplicates on
/// either side are counted: surplus copies in `current` are removed and
/// surplus copies in `desired` are inserted.
pub fn diff_by<'a, C, D>(
    current: &[C],
    desired: &'a [D],
    same: impl Fn(&C, &D) -> bool,
) -> Diff<'a, D> {
    let mut claimed = vec![false; current.len()];
    let mut insert = Vec::new();

    for d in desired {
        let hit = current
            .iter()
            .enumerate()
            .position(|(ix, c)| !claimed[ix] && same(c, d));
        match hit {
            Some(ix) => claimed[ix] = true,
            None => insert.push(d),
        }
    }

    let remove: Vec<usize> = claimed
        .iter()
        .enumerate()
        .filter(|(_, kept)| !**kept)
        .map(|(ix, _)| ix)
        .collect();

    Diff {
        unchanged: current.len() - remove.len(),
        remove,
        insert,
    }
}
