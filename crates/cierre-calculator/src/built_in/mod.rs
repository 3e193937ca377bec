//! Built-in calculators, one per priced `calc_type`.

// Flat amounts
pub mod fixed;
pub mod fixed_range;

// Percentages of the basis
pub mod percent;
pub mod percent_range;
