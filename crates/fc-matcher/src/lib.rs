//! Event filter matcher.
//!
//! A pure, dependency-free subset matcher: no regex, no JSONPath. The
//! filter and the value it's matched against are both arbitrary JSON;
//! evaluation rules are in `matches_value` below (§4.3).

use serde_json::Value;

/// Evaluate `filter` against `event` (`{payload, context}` roots).
///
/// An absent or empty filter matches anything.
pub fn matches(event_payload: &Value, event_context: &Value, filter: &Value) -> bool {
    let Value::Object(filter_map) = filter else {
        return true;
    };
    if filter_map.is_empty() {
        return true;
    }

    for (root_key, root_filter) in filter_map {
        let root_value = match root_key.as_str() {
            "payload" => event_payload,
            "context" => event_context,
            _ => continue,
        };
        if !matches_value(root_value, root_filter) {
            return false;
        }
    }
    true
}

/// Recursive subset match of `pattern` against `value`.
fn matches_value(value: &Value, pattern: &Value) -> bool {
    match pattern {
        // A missing filter branch matches anything.
        Value::Null => true,

        // Array pattern: membership test (shallow equality).
        Value::Array(allowed) => allowed.iter().any(|candidate| candidate == value),

        // Object pattern against an array value: any element may match.
        Value::Object(pattern_map) => match value {
            Value::Array(elements) => elements
                .iter()
                .any(|element| matches_object(element, pattern_map)),
            Value::Object(_) => matches_object(value, pattern_map),
            _ => false,
        },

        // Any other pattern shape (string/number/bool) has no defined
        // match against a raw value at this level.
        _ => false,
    }
}

fn matches_object(value: &Value, pattern_map: &serde_json::Map<String, Value>) -> bool {
    let Value::Object(value_map) = value else {
        return false;
    };
    for (key, child_pattern) in pattern_map {
        match value_map.get(key) {
            Some(child_value) => {
                if !matches_value(child_value, child_pattern) {
                    return false;
                }
            }
            None => {
                // Missing key: only a null/absent pattern matches.
                if !matches!(child_pattern, Value::Null) {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_matches_anything() {
        let payload = json!({"status": "paid"});
        let context = json!({});
        assert!(matches(&payload, &context, &json!({})));
    }

    #[test]
    fn array_membership_match() {
        let filter = json!({"payload": {"status": ["paid", "refunded"]}});
        assert!(matches(&json!({"status": "paid"}), &json!({}), &filter));
        assert!(!matches(&json!({"status": "pending"}), &json!({}), &filter));
    }

    #[test]
    fn nested_object_pattern_matches_recursively() {
        let filter = json!({"payload": {"order": {"total": [50, 100]}}});
        assert!(matches(&json!({"order": {"total": 50}}), &json!({}), &filter));
        assert!(!matches(&json!({"order": {"total": 75}}), &json!({}), &filter));
    }

    #[test]
    fn object_pattern_against_array_value_matches_any_element() {
        let filter = json!({"payload": {"items": {"sku": ["A1"]}}});
        let payload = json!({"items": [{"sku": "Z9"}, {"sku": "A1"}]});
        assert!(matches(&payload, &json!({}), &filter));
    }

    #[test]
    fn missing_key_in_value_fails_non_null_pattern() {
        let filter = json!({"payload": {"status": ["paid"]}});
        assert!(!matches(&json!({}), &json!({}), &filter));
    }

    #[test]
    fn context_root_is_matched_independently_of_payload() {
        let filter = json!({"context": {"env": ["prod"]}});
        assert!(matches(&json!({}), &json!({"env": "prod"}), &filter));
        assert!(!matches(&json!({}), &json!({"env": "dev"}), &filter));
    }

    #[test]
    fn both_roots_must_match_when_both_present() {
        let filter = json!({
            "payload": {"status": ["paid"]},
            "context": {"env": ["prod"]},
        });
        assert!(matches(&json!({"status": "paid"}), &json!({"env": "prod"}), &filter));
        assert!(!matches(&json!({"status": "paid"}), &json!({"env": "dev"}), &filter));
    }
}
