use super::PreviewItem;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::io::{self, IsTerminal};

/// Render items as a two-column table with an elision row and a total
pub fn render_table(items: &[PreviewItem], limit: usize, use_color: bool) -> String {
    let mut table = Table::new();

    if io::stdout().is_terminal() {
        table.set_content_arrangement(ContentArrangement::Dynamic);
    } else {
        table.set_content_arrangement(ContentArrangement::Disabled);
    }

    // Force styling even in non-TTY environments when colors are explicitly requested
    if use_color {
        table.enforce_styling();
        table.set_header(vec![
            Cell::new("Current").fg(Color::Cyan),
            Cell::new("New").fg(Color::Cyan),
        ]);
    } else {
        table.set_header(vec!["Current", "New"]);
    }

    for item in items.iter().take(limit) {
        if use_color {
            table.add_row(vec![
                Cell::new(&item.from),
                Cell::new(format!("→ {}", item.to)).fg(Color::Green),
            ]);
        } else {
            table.add_row(vec![item.from.clone(), format!("→ {}", item.to)]);
        }
    }

    if items.len() > limit {
        let elided = format!("... and {} more", items.len() - limit);
        if use_color {
            table.add_row(vec![Cell::new(elided).fg(Color::DarkGrey), Cell::new("")]);
        } else {
            table.add_row(vec![elided, String::new()]);
        }
    }

    let total = format!("{} files", items.len());
    if use_color {
        table.add_row(vec![
            Cell::new("TOTAL").fg(Color::Cyan),
            Cell::new(total).fg(Color::Yellow),
        ]);
    } else {
        table.add_row(vec!["TOTAL".to_string(), total]);
    }

    table.to_string()
}
