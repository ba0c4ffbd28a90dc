//! Transfusion planning.

mod estimator;

pub use estimator::*;
