//! Domain models for the donor-matching system.

mod assignment;
mod blood_group;
mod donor;
mod patient;
mod transfusion;

pub use assignment::*;
pub use blood_group::*;
pub use donor::*;
pub use patient::*;
pub use transfusion::*;
