//! Table formatting utilities

use prettytable::{Cell, Row, Table};
use scroll_rig::glam::Vec3;

/// Create a table with headers
pub fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let header_cells: Vec<Cell> = headers
        .into_iter()
        .map(|h| Cell::new(h).style_spec("b"))
        .collect();
    table.set_titles(Row::new(header_cells));

    table
}

/// Add a row to a table
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    let row_cells: Vec<Cell> = cells.into_iter().map(|s| Cell::new(&s)).collect();
    table.add_row(Row::new(row_cells));
}

pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

pub fn format_optional<T, F: Fn(T) -> String>(value: Option<T>, f: F) -> String {
    value.map_or_else(|| "-".to_string(), f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vec3() {
        assert_eq!(format_vec3(Vec3::new(1.0, -0.5, 0.25)), "(1.000, -0.500, 0.250)");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(1.5f32), |v| format!("{v:.1}")), "1.5");
        assert_eq!(format_optional(None::<f32>, |v| format!("{v:.1}")), "-");
    }
}
