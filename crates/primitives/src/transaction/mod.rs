//! Change sets describing one edit between two snapshot versions.

mod changeset;
mod types;

pub use changeset::ChangeSet;
pub use types::{Bias, Change, Insertion, Operation};
