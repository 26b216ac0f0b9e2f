use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use std::path::Path;

use crate::config::config::IconConfig;
use crate::data::record::{Record, EDITABLE_FIELDS};
use crate::table_view::TableView;

/// The current page as a comfy-table, with checkbox and row id columns
pub fn build_page_table(view: &TableView, icons: &IconConfig) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let checkbox = |checked: bool| {
        if checked {
            icons.checked.clone()
        } else {
            icons.unchecked.clone()
        }
    };

    let mut headers = vec![
        Cell::new(checkbox(view.header_checked())).add_attribute(Attribute::Bold),
        Cell::new("id").add_attribute(Attribute::Bold),
    ];
    headers.extend(
        ["Name", "Email", "Role"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    table.set_header(headers);

    let editing = view.editing();
    for record in view.page_rows() {
        let mut row = vec![checkbox(view.is_selected(record.id)), record.id.to_string()];
        row.extend(EDITABLE_FIELDS.iter().map(|field| record.display_field(field)));
        if editing == Some(record.id) {
            row[1] = format!("{}*", record.id);
        }
        table.add_row(row);
    }

    table
}

pub fn display_page(view: &TableView, icons: &IconConfig) {
    if view.filtered_len() == 0 {
        println!("{}", "No members found.".yellow());
        println!("{}", view.page_summary().dark_grey());
        return;
    }

    println!("{}", build_page_table(view, icons));
    println!(
        "{}    {}",
        view.selection_summary().green(),
        view.page_summary().cyan()
    );
}

/// Write records to `path` as CSV; columns are `id` then every field seen, in first-seen order
pub fn export_to_csv(records: &[&Record], path: &Path) -> Result<usize> {
    let mut headers: Vec<String> = vec!["id".to_string()];
    for record in records {
        for key in record.fields.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(&headers)?;

    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|field| {
                if field == "id" {
                    record.id.to_string()
                } else {
                    record.display_field(field)
                }
            })
            .collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(records.len())
}
