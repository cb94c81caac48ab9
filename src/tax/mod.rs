//! Tax calculations

pub mod vat;

pub use vat::*;
