// Pure table rendering functions that depend only on TableRenderContext

use crate::ui::actions::UiMode;
use crate::ui::table_render_context::{RenderRow, TableRenderContext};
use ratatui::{
    layout::Constraint,
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

/// Render the member table using only the provided context
pub fn render_table(f: &mut Frame, area: Rect, ctx: &TableRenderContext) {
    if ctx.rows.is_empty() {
        let empty = Paragraph::new("No members found")
            .block(Block::default().borders(Borders::ALL).title("Members"))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(empty, area);
        return;
    }

    let header = build_header_row(ctx);
    let rows = build_data_rows(ctx);
    let widths = calculate_column_widths(ctx);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Members ({} matching)", ctx.filtered_count)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

/// Footer line: selection count on the left, pagination strip on the right
pub fn render_footer(f: &mut Frame, area: Rect, ctx: &TableRenderContext) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(10)])
        .split(area);

    let summary = Paragraph::new(ctx.selection_summary.clone())
        .style(Style::default().fg(Color::Gray));
    f.render_widget(summary, chunks[0]);

    let mut spans = vec![
        Span::styled(ctx.page_summary.clone(), Style::default().fg(Color::Gray)),
        Span::raw("  "),
    ];
    for (label, current, enabled) in ctx.pagination_items() {
        let style = if current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", label), style));
    }

    let strip = Paragraph::new(Line::from(spans)).alignment(Alignment::Right);
    f.render_widget(strip, chunks[1]);
}

fn build_header_row(ctx: &TableRenderContext) -> Row<'static> {
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut cells = vec![Cell::from(ctx.checkbox(ctx.header_checked).to_string()).style(header_style)];

    if ctx.show_row_numbers {
        cells.push(
            Cell::from("#").style(
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }

    cells.extend(
        ctx.column_headers
            .iter()
            .map(|header| Cell::from(header.clone()).style(header_style)),
    );
    cells.push(Cell::from("Actions").style(header_style));

    Row::new(cells)
}

fn build_data_rows(ctx: &TableRenderContext) -> Vec<Row<'static>> {
    ctx.rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| build_data_row(ctx, row_idx, row))
        .collect()
}

fn build_data_row(ctx: &TableRenderContext, row_idx: usize, row: &RenderRow) -> Row<'static> {
    let mut cells = vec![Cell::from(ctx.checkbox(row.selected).to_string())];

    if ctx.show_row_numbers {
        cells.push(Cell::from(row.id.to_string()).style(Style::default().fg(Color::DarkGray)));
    }

    for (col_idx, value) in row.cells.iter().enumerate() {
        let focused = row.editing && ctx.mode == UiMode::Edit && ctx.edit_field == Some(col_idx);
        let cell = if focused {
            Cell::from(format!("{}▏", value)).style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else if row.editing {
            Cell::from(value.clone()).style(Style::default().add_modifier(Modifier::UNDERLINED))
        } else {
            Cell::from(value.clone())
        };
        cells.push(cell);
    }

    let actions_style = if row.editing {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    cells.push(Cell::from(ctx.actions_label(row)).style(actions_style));

    // Selected rows keep their tint under the cursor highlight
    let mut style = Style::default();
    if row.selected {
        style = style.bg(Color::Rgb(40, 40, 70));
    }
    if ctx.is_cursor_row(row_idx) {
        style = style.bg(Color::Rgb(70, 70, 70)).add_modifier(Modifier::BOLD);
    }

    Row::new(cells).style(style)
}

fn calculate_column_widths(ctx: &TableRenderContext) -> Vec<Constraint> {
    let checkbox_width = ctx.icons.checked.chars().count().max(ctx.icons.unchecked.chars().count());

    let mut widths = vec![Constraint::Length(checkbox_width.max(1) as u16 + 1)];
    if ctx.show_row_numbers {
        widths.push(Constraint::Length(5));
    }
    widths.push(Constraint::Percentage(28));
    widths.push(Constraint::Percentage(36));
    widths.push(Constraint::Percentage(14));
    widths.push(Constraint::Min(16));
    widths
}
