//! PR intent resolution: change-type classification, title resolution,
//! label reconciliation, and review-summary extraction.

pub mod classify;
pub mod labels;
pub mod summary;
pub mod title;
