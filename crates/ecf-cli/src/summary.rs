//! Batch run summary rendering.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

use crate::commands::BatchResult;

pub fn print_summary(result: &BatchResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Built"),
        header_cell("Failed"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(result.rows).set_alignment(CellAlignment::Right),
        Cell::new(result.built)
            .set_alignment(CellAlignment::Right)
            .fg(Color::Green),
        failed_cell(result.failures.len()),
    ]);
    println!("{table}");

    if result.has_failures() {
        let mut failures = Table::new();
        failures.set_header(vec![header_cell("Row"), header_cell("Error")]);
        apply_table_style(&mut failures);
        for failure in &result.failures {
            failures.add_row(vec![
                Cell::new(failure.row).set_alignment(CellAlignment::Right),
                Cell::new(&failure.message),
            ]);
        }
        println!("{failures}");
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn failed_cell(count: usize) -> Cell {
    let cell = Cell::new(count).set_alignment(CellAlignment::Right);
    if count > 0 { cell.fg(Color::Red) } else { cell }
}
