//! Shared helpers for the scrollrig commands

pub mod load;
pub mod table;

pub use load::{load_config, load_rig, read_document};
pub use table::{add_table_row, create_table, format_optional, format_vec3};
