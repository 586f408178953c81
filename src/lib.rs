//! Merge a billionaires roster with country-level indicator tables and
//! clean the result into a table with no missing values in the columns
//! the downstream analysis depends on.

pub mod clean;
pub mod countries;
pub mod merge;
pub mod pipeline;
