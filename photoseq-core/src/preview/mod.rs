mod list;
mod table;

pub use list::render_list;
pub use table::render_table;

use crate::plan::RenamePlan;
use std::io::{self, IsTerminal};
use std::path::Path;

/// Number of planned items shown before the rest is elided
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preview {
    List,
    Table,
    None,
}

impl std::str::FromStr for Preview {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(Self::List),
            "table" => Ok(Self::Table),
            "none" => Ok(Self::None),
            _ => Err(format!("Invalid preview format: {}", s)),
        }
    }
}

/// One line of a preview: what exists now and what it becomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    pub from: String,
    pub to: String,
}

impl PreviewItem {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Determine whether to use colors based on explicit preference or terminal detection
pub fn should_use_color_with_detector<F>(use_color: Option<bool>, is_terminal: F) -> bool
where
    F: Fn() -> bool,
{
    match use_color {
        Some(explicit_color) => explicit_color,
        None => is_terminal(),
    }
}

pub fn should_use_color(use_color: Option<bool>) -> bool {
    should_use_color_with_detector(use_color, || io::stdout().is_terminal())
}

pub fn plan_items(plan: &RenamePlan) -> Vec<PreviewItem> {
    plan.renames
        .iter()
        .map(|r| PreviewItem::new(r.source_name(), r.destination_name()))
        .collect()
}

/// Preview rows for a conversion batch: `photo.png -> photo.webp`
pub fn conversion_items(files: &[impl AsRef<Path>], extension: &str) -> Vec<PreviewItem> {
    files
        .iter()
        .map(|file| {
            let file = file.as_ref();
            let from = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            PreviewItem::new(from, format!("{stem}.{extension}"))
        })
        .collect()
}

/// Render at most `limit` items in the requested format
pub fn render_items(items: &[PreviewItem], format: Preview, limit: usize, use_color: bool) -> String {
    match format {
        Preview::List => render_list(items, limit, use_color),
        Preview::Table => render_table(items, limit, use_color),
        Preview::None => String::new(),
    }
}

pub fn render_plan(plan: &RenamePlan, format: Preview, limit: usize, use_color: bool) -> String {
    render_items(&plan_items(plan), format, limit, use_color)
}
