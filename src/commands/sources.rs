use std::fmt::Write;

use crate::docs::filter::ListFilter;
use crate::docs::Desk;

use super::ask::render_answer;

pub fn list(desk: &mut Desk, filter: ListFilter) -> String {
    desk.set_filter(filter);
    format!("Loading {} documents...", filter)
}

pub fn refresh(desk: &mut Desk) -> String {
    let filter = desk.active_filter();
    desk.refresh();
    format!("Reloading {} documents...", filter)
}

/// One line per document, in collection order.
pub fn render_documents(desk: &Desk) -> String {
    if desk.documents().is_empty() {
        return "No PDFs".to_string();
    }

    let mut out = String::new();
    for doc in desk.documents() {
        let mark = if doc.selected { "[x]" } else { "[ ]" };
        let qa = if desk.qa_selection() == Some(doc.id) { " *" } else { "" };
        let file = match (&doc.file, doc.has_file()) {
            (Some(f), true) => f.as_str(),
            _ => "(no file)",
        };
        let _ = writeln!(out, "  {} #{:<4} {}{}  {}", mark, doc.id, doc.name, qa, file);
    }
    out.trim_end().to_string()
}

pub fn show(desk: &Desk) -> String {
    let mut out = format!("Filter: {}\n{}", desk.active_filter(), render_documents(desk));

    if desk.listing().is_pending() {
        out.push_str("\n(loading...)");
    }
    if let Some(file) = desk.staged_upload() {
        let _ = write!(out, "\nStaged upload: {}", file.file_name);
    }
    if desk.pending_writes() > 0 {
        let _ = write!(out, "\nUnsaved edits: {}", desk.pending_writes());
    }

    if desk.asking().is_pending() {
        out.push_str("\nAsking...");
    } else if let Some(err) = desk.ask_error() {
        let _ = write!(out, "\nError: {}", err);
    } else if let Some(answer) = desk.answer() {
        let _ = write!(out, "\n{}", render_answer(answer));
    }
    out
}
