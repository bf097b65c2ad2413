//! Cross-engine validation.

use crate::types::{Candidate, EngineSightings};

/// Set each candidate's `cross_engine_validated` flag from the pass's
/// sightings: true when an engine other than the candidate's own source
/// engine also produced the name. Returns the number of validated candidates.
///
/// Applying it twice gives the same flags.
pub fn cross_validate(candidates: &mut [Candidate], sightings: &EngineSightings) -> usize {
    candidates
        .iter_mut()
        .map(|c| {
            c.cross_engine_validated = sightings.seen_by_other_engine(&c.full_name, &c.source_engine);
            c.cross_engine_validated
        })
        .filter(|validated| *validated)
        .count()
}
