use serde_yaml::Value;

/// Recursive structural diff between two YAML values, producing one line
/// per differing or missing key. Used for the audit log written before
/// every manifest edit is applied.
pub fn diff_values(prefix: &str, before: &Value, after: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    match (before, after) {
        (Value::Mapping(a), Value::Mapping(b)) => {
            for (key, a_value) in a {
                let key_str = key.as_str().unwrap_or("?").to_string();
                let path = if prefix.is_empty() { key_str.clone() } else { format!("{prefix}.{key_str}") };
                match b.get(key) {
                    Some(b_value) => lines.extend(diff_values(&path, a_value, b_value)),
                    None => lines.push(format!("- {path}: removed")),
                }
            }
            for key in b.keys() {
                if !a.contains_key(key) {
                    let key_str = key.as_str().unwrap_or("?").to_string();
                    let path = if prefix.is_empty() { key_str.clone() } else { format!("{prefix}.{key_str}") };
                    lines.push(format!("+ {path}: added"));
                }
            }
        }
        _ if before != after => {
            lines.push(format!("{prefix}: {before:?} -> {after:?}"));
        }
        _ => {}
    }
    lines
}
