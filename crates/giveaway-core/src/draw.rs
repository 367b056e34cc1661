// Weighted winner selection.

use crate::tally::{Participant, ParticipantEntry, Tally};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

// ---------------------------------------------------------------------------
// Random source
// ---------------------------------------------------------------------------

/// Source of the two random choices a draw needs.
pub trait RandomSource {
    /// Index chosen with probability proportional to its weight, or `None`
    /// when no weight is positive.
    fn pick_weighted(&mut self, weights: &[u64]) -> Option<usize>;

    /// Index chosen uniformly from `0..len`, or `None` when `len` is zero.
    fn pick_uniform(&mut self, len: usize) -> Option<usize>;
}

/// [`RandomSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<ThreadRng> {
    /// Fresh OS-seeded entropy; two runs never share a sequence.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl RngSource<ChaCha8Rng> {
    /// Reproducible sequence for audits and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn pick_weighted(&mut self, weights: &[u64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights.iter().copied()).ok()?;
        Some(dist.sample(&mut self.rng))
    }

    fn pick_uniform(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }
}

// ---------------------------------------------------------------------------
// Draw
// ---------------------------------------------------------------------------

/// The drawn participant and the comment shown as the winning entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Winner<'a> {
    pub participant: &'a Participant,
    pub entry: &'a ParticipantEntry,
}

/// Draw one winner, weighted by entry count.
///
/// The winning comment is then chosen uniformly among the winner's entries;
/// it plays no part in the weighting. Returns `None` for a contest without
/// eligible participants.
pub fn draw_winner<'a, S>(tally: &'a Tally, source: &mut S) -> Option<Winner<'a>>
where
    S: RandomSource + ?Sized,
{
    // Stable order (BTreeMap) keeps seeded draws reproducible.
    let eligible: Vec<&Participant> = tally.participants().values().collect();
    if eligible.is_empty() {
        info!("no eligible participants, nothing to draw");
        return None;
    }

    let weights: Vec<u64> = eligible.iter().map(|p| p.entry_count).collect();
    let participant = *eligible.get(source.pick_weighted(&weights)?)?;
    let entry = participant
        .entries
        .get(source.pick_uniform(participant.entries.len())?)?;

    info!(
        winner = %participant.handle,
        entries = participant.entry_count,
        comment_id = entry.comment_id,
        "winner drawn"
    );
    Some(Winner { participant, entry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentRecord;
    use crate::tally::{aggregate, CountingMode};

    /// Replays fixed answers.
    struct Scripted {
        weighted: usize,
        uniform: usize,
    }

    impl RandomSource for Scripted {
        fn pick_weighted(&mut self, weights: &[u64]) -> Option<usize> {
            (self.weighted < weights.len()).then_some(self.weighted)
        }

        fn pick_uniform(&mut self, len: usize) -> Option<usize> {
            (self.uniform < len).then_some(self.uniform)
        }
    }

    fn link(id: &str) -> String {
        format!("https://jorbites.com/recipes/{id}")
    }

    fn sample_tally() -> Tally {
        let records = vec![
            CommentRecord::new(10, "alice", &link("a")),
            CommentRecord::new(11, "bob", &link("b")),
            CommentRecord::new(12, "bob", &link("c")),
        ];
        aggregate(&records, CountingMode::PerComment)
    }

    #[test]
    fn empty_tally_has_no_winner() {
        let tally = Tally::default();
        assert!(draw_winner(&tally, &mut RngSource::from_entropy()).is_none());
        assert!(draw_winner(&tally, &mut RngSource::seeded(1)).is_none());
    }

    #[test]
    fn scripted_source_selects_in_handle_order() {
        let tally = sample_tally();
        let mut source = Scripted {
            weighted: 1,
            uniform: 1,
        };
        let winner = draw_winner(&tally, &mut source).unwrap();
        assert_eq!(winner.participant.handle, "bob");
        assert_eq!(winner.entry.comment_id, 12);
    }

    #[test]
    fn out_of_range_source_yields_no_winner() {
        let tally = sample_tally();
        let mut source = Scripted {
            weighted: 5,
            uniform: 0,
        };
        assert!(draw_winner(&tally, &mut source).is_none());
    }

    #[test]
    fn single_participant_always_wins() {
        let records = vec![CommentRecord::new(1, "solo", &link("x"))];
        let tally = aggregate(&records, CountingMode::PerComment);
        for seed in 0..20 {
            let winner = draw_winner(&tally, &mut RngSource::seeded(seed)).unwrap();
            assert_eq!(winner.participant.handle, "solo");
            assert_eq!(winner.entry.comment_id, 1);
        }
    }

    #[test]
    fn winning_entry_belongs_to_winner() {
        let tally = sample_tally();
        let mut source = RngSource::seeded(7);
        for _ in 0..100 {
            let winner = draw_winner(&tally, &mut source).unwrap();
            assert!(winner.participant.entries.contains(winner.entry));
        }
    }

    #[test]
    fn same_seed_same_draw() {
        let tally = sample_tally();
        let a = draw_winner(&tally, &mut RngSource::seeded(42)).unwrap();
        let b = draw_winner(&tally, &mut RngSource::seeded(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn boxed_source_draws() {
        let tally = sample_tally();
        let mut boxed: Box<dyn RandomSource> = Box::new(RngSource::seeded(42));
        let via_box = draw_winner(&tally, boxed.as_mut()).unwrap();
        let direct = draw_winner(&tally, &mut RngSource::seeded(42)).unwrap();
        assert_eq!(via_box, direct);
    }

    #[test]
    fn reloaded_hollow_participant_is_not_drawable() {
        let mut hollow = Participant::new("solo", None);
        hollow.entry_count = 3;
        let tally = Tally::from_participants(vec![hollow]);
        assert!(tally.is_empty());
        assert!(draw_winner(&tally, &mut RngSource::seeded(1)).is_none());
    }

    #[test]
    fn rng_source_rejects_degenerate_input() {
        let mut source = RngSource::seeded(3);
        assert_eq!(source.pick_weighted(&[]), None);
        assert_eq!(source.pick_weighted(&[0, 0]), None);
        assert_eq!(source.pick_weighted(&[0, 5, 0]), Some(1));
        assert_eq!(source.pick_uniform(0), None);
        assert_eq!(source.pick_uniform(1), Some(0));
    }
}
