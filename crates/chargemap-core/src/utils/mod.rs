//! Formatting helpers shared by front ends.

pub mod format;

pub use format::{format_coordinates, format_power, map_bounds, truncate_string, MapBounds};
