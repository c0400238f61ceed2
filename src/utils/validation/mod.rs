//! Parameter validation

mod numeric;

pub use numeric::NumericValidator;
