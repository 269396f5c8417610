//! Analysis modules.
//!
//! Aggregation of feedback statistics and default website resolution.

pub mod aggregator;
pub mod resolver;

pub use aggregator::*;
pub use resolver::DefaultSiteCache;
