use crate::docs::types::{DocId, FieldEdit};
use crate::docs::Desk;

pub fn rename(desk: &mut Desk, id: DocId, name: String) -> String {
    if desk.update_field(id, FieldEdit::Name(name.clone())) {
        format!("#{} renamed to {}", id, name)
    } else {
        format!("No document #{}", id)
    }
}

pub fn select(desk: &mut Desk, id: DocId, on: bool) -> String {
    if !desk.update_field(id, FieldEdit::Selected(on)) {
        return format!("No document #{}", id);
    }
    if on {
        format!("#{} selected", id)
    } else {
        format!("#{} unselected", id)
    }
}

/// Delete a document (removed locally once the server confirms)
pub fn delete(desk: &mut Desk, id: DocId) -> String {
    desk.remove(id);
    format!("Deleting #{}...", id)
}

pub async fn flush(desk: &Desk) -> String {
    let pending = desk.pending_writes();
    desk.flush().await;
    format!("Sent {} pending edit(s).", pending)
}
