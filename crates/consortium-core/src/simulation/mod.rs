pub mod calculator;
pub mod comparison;
