use std::time::Duration;

use crate::docs::Desk;

/// Show or change sync settings
pub fn config(desk: &mut Desk, change: Option<(String, u64)>) -> String {
    match change {
        None => format!(
            "Sync configuration:\n  debounce_ms: {}",
            desk.debounce().as_millis()
        ),
        Some((key, value)) => match key.as_str() {
            "debounce_ms" => {
                desk.set_debounce(Duration::from_millis(value));
                format!("debounce_ms set to {}", value)
            }
            _ => format!("Unknown setting `{}`. Valid: `debounce_ms`", key),
        },
    }
}
