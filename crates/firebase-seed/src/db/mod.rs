//! Seeding source files into the document store.
//!
//! The [`Seeder`] reads each manifest entry's JSON file and writes its
//! records one at a time, in file order.

mod seeder;

pub use seeder::{ImportSummary, RunSummary, SeedError, Seeder};
