use std::fmt::Write;

use crate::docs::types::{Answer, DocId};
use crate::docs::Desk;

pub fn use_document(desk: &mut Desk, id: DocId) -> String {
    if desk.select_for_qa(id) {
        let name = desk.get(id).map(|d| d.name.as_str()).unwrap_or("");
        format!("Asking about #{} {}", id, name)
    } else {
        format!("No document #{}", id)
    }
}

/// Ask about the picked document
pub fn ask(desk: &mut Desk, question: &str) -> String {
    if question.trim().is_empty() {
        return "usage: ask <question>".to_string();
    }
    // A selection exists whenever the collection is non-empty.
    match desk.ask(question) {
        Some(_) => "Asking...".to_string(),
        None => "Upload a PDF first.".to_string(),
    }
}

/// Answer text followed by its sources, `Page N: ` prefixed when known.
pub fn render_answer(answer: &Answer) -> String {
    let mut out = format!("Answer:\n{}", answer.answer);
    if !answer.sources.is_empty() {
        out.push_str("\n\nSources:");
        for source in &answer.sources {
            match source.page {
                Some(page) => {
                    let _ = write!(out, "\n- Page {}: {}", page, source.snippet);
                }
                None => {
                    let _ = write!(out, "\n- {}", source.snippet);
                }
            }
        }
    }
    out
}
