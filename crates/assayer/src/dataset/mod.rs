//! Dataset model and cell helpers.

mod cell;
mod table;

pub use cell::{as_number, as_year, is_missing, is_missing_opt, number_value, stringify};
pub use table::{check_shape, ensure_unique_columns, Dataset, ShapeIssue};
