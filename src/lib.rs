//! Entity scoring and threshold selection for datasheet attribute extraction.
//!
//! Candidates exported by an extraction framework are mapped to unit-aware
//! entities, scored against hand-curated gold sets, and swept over a decision
//! threshold to find the cutoff with the best F1.

pub mod candidates;
pub mod config;
pub mod data;
pub mod entity;
pub mod error;
pub mod logging;
pub mod quantity;
pub mod report;
pub mod scoring;

pub use candidates::{mapper::EntityMapper, Candidate, RecordedCandidate};
pub use data::gold::{GoldPolicy, GoldSet, Pairing};
pub use entity::{Attribute, Entity, EntityValue};
pub use error::{EvalError, QuantityError};
pub use quantity::{Quantity, Unit};
pub use scoring::{
    score,
    sweep::{sweep, SweepConfig, SweepOutcome},
    Score,
};
