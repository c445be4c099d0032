//! Gold annotations, document lists and probability dumps.

pub mod documents;
pub mod gold;
pub mod normalize;
pub mod probs;
