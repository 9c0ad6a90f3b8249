//! CLI command implementations

pub mod corpus;
pub mod inspect;
pub mod report;
pub mod run;
