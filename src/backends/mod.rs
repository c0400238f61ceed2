//! Provider implementations
//!
//! - `mock`: deterministic in-process providers for tests and demos
//! - `static_source`: replay mask images and box lists from disk

pub mod mock;
pub mod static_source;

pub use self::mock::{MockDetectionProvider, MockFailure, MockSegmentationProvider};
pub use self::static_source::{StaticBoxProvider, StaticMaskProvider};
