//! Built-in components: Container, Label, Button, Checkbox, ListView,
//! TextField, Modal, KeyLegendBar.

pub mod button;
pub mod checkbox;
pub mod container;
pub mod label;
pub mod legend_bar;
pub mod list;
pub mod modal;
pub mod text_field;

pub use button::Button;
pub use checkbox::Checkbox;
pub use container::Container;
pub use label::Label;
pub use legend_bar::KeyLegendBar;
pub use list::ListView;
pub use modal::Modal;
pub use text_field::TextField;

use serde_json::Value;

/// Display text for a model value: strings as-is, objects by their `label`
/// or `name` field, anything else as JSON.
pub(crate) fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(map) => map
            .get("label")
            .or_else(|| map.get("name"))
            .map_or_else(|| value.to_string(), display_text),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_text_prefers_label_then_name() {
        assert_eq!(display_text(&json!("web")), "web");
        assert_eq!(display_text(&json!({"name": "api", "label": "API server"})), "API server");
        assert_eq!(display_text(&json!({"name": "api"})), "api");
        assert_eq!(display_text(&json!(3)), "3");
        assert_eq!(display_text(&json!(null)), "");
    }
}
