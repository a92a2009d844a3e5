pub mod map;
pub mod stations;
