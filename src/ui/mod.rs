//! CLI UI utilities for styled terminal output.
//!
//! Colored status lines, section headers and the per-document detail
//! panel.

use owo_colors::OwoColorize;

use crate::models::{Document, PLACEHOLDER};

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
}

/// Status icons for the different message kinds.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
    }
}

/// Print a styled status message.
#[macro_export]
macro_rules! print_status {
    ($status:expr, $msg:expr) => {{
        use owo_colors::OwoColorize as _;
        use $crate::ui::{status_icon, Status};
        let icon = status_icon($status);
        match $status {
            Status::Success => println!("{} {}", icon.green().bold(), $msg),
            Status::Error => eprintln!("{} {}", icon.red().bold(), $msg),
            Status::Warning => eprintln!("{} {}", icon.yellow().bold(), $msg),
            Status::Info => println!("{} {}", icon.cyan().bold(), $msg),
        }
    }};
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "─".repeat(72).dimmed());
}

/// Print one document's full details.
pub fn print_document_panel(doc: &Document) {
    print_section(&doc.title);

    println!("  {}    {}", "Journal:".bold(), doc.journal);
    println!("  {}  {}", "Published:".bold(), doc.pub_date);
    println!(
        "  {}       {} ({})",
        "Type:".bold(),
        doc.doc_type,
        doc.source_type
    );
    println!(
        "  {}  {}",
        "Citations:".bold(),
        doc.citations.to_string().yellow()
    );
    println!("  {}        {}", "DOI:".bold(), doc.doi);
    println!("  {}        {}", "EID:".bold(), doc.eid);

    print_divider();
    println!("{}", "Abstract".bold());
    println!("{}", doc.abstract_text);

    print_divider();
    println!("{}", "Authors".bold());
    if doc.authors.is_empty() {
        println!("  {}", PLACEHOLDER);
    } else {
        for author in &doc.authors {
            println!("  - {}", author);
        }
    }
    println!(
        "  {} {}",
        "First author:".bold(),
        doc.first_author
    );
    println!(
        "  {} {}",
        "Corresponding author:".bold(),
        doc.corresponding_author.green()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_icons_are_distinct() {
        let icons = [
            status_icon(Status::Success),
            status_icon(Status::Error),
            status_icon(Status::Warning),
            status_icon(Status::Info),
        ];
        for (i, a) in icons.iter().enumerate() {
            for b in icons.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
