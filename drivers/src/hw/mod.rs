//! Register maps and fixed hardware constants.

pub mod mc1322x;
