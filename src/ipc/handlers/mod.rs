pub mod core;
pub mod fields;
pub mod lists;
