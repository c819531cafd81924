//! Display formatting for code sections
//!
//! Device command output often arrives as a JSON object. For display it is
//! flattened into upper-cased keys followed by their values, one per line.
//! Anything that is not a JSON object is shown as-is.

use serde_json::{Map, Value};

/// Format the content of a code section for display.
///
/// # Examples
///
/// ```
/// use netgpt::parser::code::format_code_content;
///
/// let formatted = format_code_content(r#"{"hostname": "core-1", "uptime": "4 days"}"#);
/// assert_eq!(formatted, "HOSTNAME\ncore-1\nUPTIME\n4 days");
///
/// assert_eq!(format_code_content("show ip route\n"), "show ip route\n");
/// ```
pub fn format_code_content(content: &str) -> String {
    match serde_json::from_str::<Map<String, Value>>(content) {
        Ok(object) => object
            .iter()
            .map(|(key, value)| match value {
                Value::Object(inner) => {
                    let mut lines = vec![key.clone()];
                    lines.extend(inner.iter().map(|(k, v)| labelled(k, v)));
                    lines.join("\n")
                }
                other => labelled(key, other),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Err(_) => content.to_string(),
    }
}

fn labelled(key: &str, value: &Value) -> String {
    format!("{}\n{}", key.to_uppercase(), display_value(value))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flat_object() {
        let formatted = format_code_content(r#"{"version": "17.3", "model": "C9300"}"#);
        assert_eq!(formatted, "VERSION\n17.3\nMODEL\nC9300");
    }

    #[test]
    fn test_nested_object_keeps_outer_key() {
        let formatted =
            format_code_content(r#"{"Gi0/1": {"status": "up", "vlan": "10"}, "note": "ok"}"#);
        assert_eq!(formatted, "Gi0/1\nSTATUS\nup\nVLAN\n10\nNOTE\nok");
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let formatted = format_code_content(r#"{"ports": 48, "stacked": true, "peer": null}"#);
        assert_eq!(formatted, "PORTS\n48\nSTACKED\ntrue\nPEER\n");
    }

    #[test]
    fn test_plain_text_passes_through() {
        let content = "Interface  Status\nGi0/1      up\n";
        assert_eq!(format_code_content(content), content);
    }

    #[test]
    fn test_json_array_passes_through() {
        let content = "[1, 2, 3]\n";
        assert_eq!(format_code_content(content), content);
    }
}
