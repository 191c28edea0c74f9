//! Sorts and hides columns, saves the view state as JSON, then applies it to
//! a freshly loaded copy of the data.
//!
//! Run with: cargo run -p gridstate --example state_roundtrip

use std::sync::Arc;

use chrono::NaiveDate;
use gridstate::model::{CellValue, TableModel};
use gridstate::{DisplayChange, ViewCoordinator, ViewState};

fn load_table() -> Arc<TableModel> {
    let numbers = [200, 100, 700, 400, 900, 300, 500];
    let colors = ["red", "blue", "green", "yellow", "black", "white", "grey"];
    let rows = numbers
        .into_iter()
        .zip(colors)
        .enumerate()
        .map(|(day, (number, color))| {
            let date = NaiveDate::from_ymd_opt(2003, 6, 1 + day as u32).unwrap_or_default();
            vec![CellValue::from(color), CellValue::from(number), CellValue::from(date)]
        })
        .collect();
    Arc::new(TableModel::new(["Color", "Number", "Date"]).with_rows(rows))
}

fn print_view(view: &ViewCoordinator) {
    let headers: Vec<_> = view
        .columns()
        .visible_columns()
        .iter()
        .map(|c| format!("{:<20}", c.header()))
        .collect();
    println!("{}", headers.concat());
    for row in 0..view.row_count() {
        let cells: Vec<_> = (0..view.column_count())
            .map(|col| format!("{:<20}", view.value_at(row, col).to_string()))
            .collect();
        println!("{}", cells.concat());
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("gridstate=debug")
        .init();

    let view = ViewCoordinator::new(load_table());
    view.signals().display_changed.connect(|change| {
        if *change == DisplayChange::Structure {
            println!("(structure changed)");
        }
    });

    // Two clicks on "Number": ascending, then descending.
    view.header_clicked(1);
    view.header_clicked(1);
    view.hide_column(&"Date".into());
    print_view(&view);

    let json = view.get_state().to_json()?;
    println!("saved state:\n{json}\n");

    let reloaded = ViewCoordinator::new(load_table());
    let state = ViewState::from_json(&json)?;
    if reloaded.set_state(&state)? {
        println!("state restored on the reloaded table:");
        print_view(&reloaded);
    }

    for entry in reloaded.menu_entries() {
        println!("[{}] {}", if entry.visible { 'x' } else { ' ' }, entry.header);
    }

    Ok(())
}
