use super::PreviewItem;
use nu_ansi_term::Color;
use std::fmt::Write;

/// Render items as indented `from -> to` lines, eliding everything past
/// `limit`
pub fn render_list(items: &[PreviewItem], limit: usize, use_color: bool) -> String {
    let mut output = String::new();

    for item in items.iter().take(limit) {
        if use_color {
            writeln!(
                output,
                "  {} {} {}",
                item.from,
                Color::DarkGray.paint("->"),
                Color::Green.paint(&item.to)
            )
            .unwrap();
        } else {
            writeln!(output, "  {} -> {}", item.from, item.to).unwrap();
        }
    }

    if items.len() > limit {
        let remaining = items.len() - limit;
        let line = format!("  ... and {} more", remaining);
        if use_color {
            writeln!(output, "{}", Color::DarkGray.paint(line)).unwrap();
        } else {
            writeln!(output, "{}", line).unwrap();
        }
    }

    output
}
