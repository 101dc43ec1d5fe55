//! Utility functions shared across the crate.
//!
//! ## Modules
//!
//! - [`app_data`] - Config file and application data directory
//! - [`duration`] - Compact durations such as `2w3d`
//! - [`natural`] - Natural-order string comparison
//! - [`size`] - Size ranges parsed from free-text descriptions
//!
//! ```
//! use taxa::utils::{natural_cmp, parse_duration};
//! use std::cmp::Ordering;
//!
//! assert_eq!(natural_cmp("Zone 2", "Zone 10"), Ordering::Less);
//! assert_eq!(parse_duration("1d").map(|d| d.num_hours()), Some(24));
//! ```

pub mod app_data;
pub mod duration;
pub mod natural;
pub mod size;

pub use app_data::*;
pub use duration::parse_duration;
pub use natural::natural_cmp;
pub use size::{parse_size, SizeRange};
