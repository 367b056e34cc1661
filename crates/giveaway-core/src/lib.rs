// Contest entry tallying and weighted winner selection.
//
// Raw comments flow through `extract` (recipe links) into `tally`
// (participants and weights); `draw` picks a winner from the result.

pub mod comment;
pub mod draw;
pub mod extract;
pub mod tally;

pub use comment::{Author, CommentRecord, RawTimestamp};
pub use draw::{draw_winner, RandomSource, RngSource, Winner};
pub use extract::{extract_recipe_ids, RecipeLinkExtractor, DEFAULT_RECIPE_DOMAIN};
pub use tally::{aggregate, aggregate_with, CountingMode, Participant, ParticipantEntry, Tally};
