// Library root: the collaborators around giveaway-core (config, comment
// dumps, reports, CLI), exposed so integration tests can drive full runs.

pub mod cli;
pub mod config;
pub mod post;
pub mod report;
pub mod source;
