//! Table observer for pretty-printing reference counters.
//!
//! This module provides [`TableObserver`], which renders the classes of a
//! [`RefCount`] as a formatted ASCII table using the `tabled` crate.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature:
//!
//! ```toml
//! [dependencies]
//! classref = { version = "0.1", features = ["table"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use classref::refcount::RefCount;
//! use classref::observers::table::{TableObserver, TableStyle};
//!
//! let rc = RefCount::new().with_name("socket");
//! rc.resolve("rx").add(2);
//! rc.resolve("tx").dec();
//!
//! println!("{}", TableObserver::new().with_style(TableStyle::Rounded).render(&rc));
//! // socket
//! // ╭──────────┬───────┬───────────╮
//! // │ Class    │ Count │ Status    │
//! // ├──────────┼───────┼───────────┤
//! // │ rx       │ 2     │ ok        │
//! // │ tx       │ -1    │ IMBALANCE │
//! // │ (global) │ 2     │ ok        │
//! // ╰──────────┴───────┴───────────╯
//! ```

use tabled::{settings::Style, Table, Tabled};

use crate::refcount::RefCount;

/// Label of the row carrying the global count.
const GLOBAL_ROW: &str = "(global)";

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Modern style with clean lines
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// No borders, just spacing
    Blank,
}

/// Configuration for the table observer.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// The style to use for rendering.
    pub style: TableStyle,
    /// Whether to show the header row.
    pub show_header: bool,
    /// Whether to append a row with the global count.
    pub show_global: bool,
    /// Whether to list only imbalanced classes.
    pub only_imbalanced: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            show_header: true,
            show_global: true,
            only_imbalanced: false,
        }
    }
}

/// Status shown next to a count.
fn status(count: isize) -> &'static str {
    match count {
        c if c < 0 => "IMBALANCE",
        0 => "zero",
        _ => "ok",
    }
}

/// Internal row representation for tabled.
#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "Class")]
    key: String,
    #[tabled(rename = "Count")]
    count: isize,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// An observer that renders the classes of a counter as a table.
///
/// The counter name, if any, is printed as a title above the table.
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    config: TableConfig,
}

impl TableObserver {
    /// Creates a new table observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table observer with the specified configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Sets whether to show the header row.
    pub fn with_header(mut self, show: bool) -> Self {
        self.config.show_header = show;
        self
    }

    /// Sets whether to append the global count row.
    pub fn with_global(mut self, show: bool) -> Self {
        self.config.show_global = show;
        self
    }

    /// Restricts the table to imbalanced classes.
    pub fn only_imbalanced(mut self, enabled: bool) -> Self {
        self.config.only_imbalanced = enabled;
        self
    }

    /// Applies the configured style to a table.
    fn apply_style(&self, table: &mut Table) {
        match self.config.style {
            TableStyle::Ascii => {
                table.with(Style::ascii());
            }
            TableStyle::Rounded => {
                table.with(Style::rounded());
            }
            TableStyle::Sharp => {
                table.with(Style::sharp());
            }
            TableStyle::Modern => {
                table.with(Style::modern());
            }
            TableStyle::Markdown => {
                table.with(Style::markdown());
            }
            TableStyle::Blank => {
                table.with(Style::blank());
            }
        }
    }

    /// Renders the counter as a formatted table string.
    pub fn render(&self, rc: &RefCount) -> String {
        let mut rows: Vec<ClassRow> = rc
            .classes()
            .iter()
            .map(|class| (class.key().to_string(), class.read()))
            .filter(|(_, count)| !self.config.only_imbalanced || *count < 0)
            .map(|(key, count)| ClassRow {
                key,
                count,
                status: status(count),
            })
            .collect();

        if self.config.show_global {
            let global = rc.read();
            rows.push(ClassRow {
                key: GLOBAL_ROW.to_string(),
                count: global,
                status: status(global),
            });
        }

        let mut table = Table::new(&rows);
        self.apply_style(&mut table);

        if !self.config.show_header {
            table.with(tabled::settings::Remove::row(
                tabled::settings::object::Rows::first(),
            ));
        }

        if rc.name().is_empty() {
            table.to_string()
        } else {
            format!("{}\n{}", rc.name(), table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RefCount {
        let rc = RefCount::new();
        rc.resolve("rx").add(2);
        rc.resolve("tx").dec();
        rc.resolve("idle");
        rc
    }

    #[test]
    fn test_render_empty() {
        let output = TableObserver::new().render(&RefCount::new());
        assert!(output.contains("Class"));
        assert!(output.contains(GLOBAL_ROW));
    }

    #[test]
    fn test_render_classes() {
        let output = TableObserver::new().render(&sample());
        assert!(output.contains("rx"));
        assert!(output.contains("IMBALANCE"));
        assert!(output.contains("zero"));
        assert!(output.contains(GLOBAL_ROW));
    }

    #[test]
    fn test_render_with_title() {
        let rc = RefCount::new().with_name("socket");
        let output = TableObserver::new().render(&rc);
        assert!(output.starts_with("socket\n"));
    }

    #[test]
    fn test_render_without_header() {
        let output = TableObserver::new().with_header(false).render(&sample());
        assert!(!output.contains("Status"));
        assert!(output.contains("rx"));
    }

    #[test]
    fn test_render_without_global() {
        let output = TableObserver::new().with_global(false).render(&sample());
        assert!(!output.contains(GLOBAL_ROW));
    }

    #[test]
    fn test_render_only_imbalanced() {
        let output = TableObserver::new()
            .only_imbalanced(true)
            .with_global(false)
            .render(&sample());
        assert!(output.contains("tx"));
        assert!(!output.contains("rx"));
        assert!(!output.contains("idle"));
    }

    #[test]
    fn test_render_styles() {
        let rc = sample();
        for style in [
            TableStyle::Ascii,
            TableStyle::Rounded,
            TableStyle::Sharp,
            TableStyle::Modern,
            TableStyle::Markdown,
            TableStyle::Blank,
        ] {
            let output = TableObserver::new().with_style(style).render(&rc);
            assert!(output.contains("tx"), "style {style:?}");
        }
    }

    #[test]
    fn test_ascii_style() {
        let output = TableObserver::new()
            .with_style(TableStyle::Ascii)
            .render(&sample());
        assert!(output.contains('+'));
        assert!(output.contains('|'));
    }

    #[test]
    fn test_status() {
        assert_eq!(status(-1), "IMBALANCE");
        assert_eq!(status(0), "zero");
        assert_eq!(status(3), "ok");
    }
}
