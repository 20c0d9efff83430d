//! Document identity and name predicates.

mod matcher;
mod name;

pub use matcher::{DocumentNameMatcher, MatchTrace};
pub use name::{DocumentName, DocumentNameBuilder, FsInfo};
