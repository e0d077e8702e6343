//! Calculation pipeline for the Simples Nacional monthly tax.
//!
//! A calculation flows through three stages, each usable on its own:
//!
//! 1. [`BracketResolver`] picks the bracket for the trailing revenue (RBT12).
//! 2. [`RateCalculator`] turns the bracket into an effective rate and the
//!    month's tax due.
//! 3. [`PartitionEngine`] splits the tax due across the sub-taxes.
//!
//! [`SimplesCalculator`] chains the three over an [`AnnexTable`](crate::AnnexTable).

pub mod common;
pub mod engine;
pub mod partition;
pub mod rate;
pub mod resolver;

pub use engine::SimplesCalculator;
pub use partition::PartitionEngine;
pub use rate::RateCalculator;
pub use resolver::{BracketResolver, CeilingPolicy};
