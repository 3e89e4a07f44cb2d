//! Endpoint set decoding.
//!
//! Service registries publish a named set of endpoints as a single value:
//!
//! ```json
//! {"kind": "Endpoints", "endpoints": ["10.0.0.1:80", "10.0.0.2:80"]}
//! ```
//!
//! [`decode_endpoints`] recognises that encoding. Anything else is an opaque
//! value and is left to the caller.

use serde::{Deserialize, Serialize};

/// A named collection of endpoint addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSet {
    /// Kind discriminator. Its value is never checked.
    pub kind: String,
    /// Endpoint addresses in encoded order.
    pub endpoints: Vec<String>,
}

/// Wire shape: either field may be missing or null.
#[derive(Deserialize)]
struct RawEndpointSet {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    endpoints: Option<Vec<String>>,
}

impl From<RawEndpointSet> for EndpointSet {
    fn from(raw: RawEndpointSet) -> Self {
        Self {
            kind: raw.kind.unwrap_or_default(),
            endpoints: raw.endpoints.unwrap_or_default(),
        }
    }
}

impl EndpointSet {
    /// Consume the set, returning its addresses.
    pub fn into_endpoints(self) -> Vec<String> {
        self.endpoints
    }
}

/// Decode `raw` as an [`EndpointSet`].
///
/// Any JSON object whose `kind` (if present) is a string and whose
/// `endpoints` (if present) is an array of strings decodes; missing or null
/// fields decode as empty. Returns `None` for anything else.
pub fn decode_endpoints(raw: &str) -> Option<EndpointSet> {
    serde_json::from_str::<RawEndpointSet>(raw)
        .ok()
        .map(EndpointSet::from)
}

/// Expand a leaf value into list entries.
///
/// An endpoint set expands to its addresses; any other value is returned
/// verbatim as a single entry.
pub fn expand_value(raw: &str) -> Vec<String> {
    match decode_endpoints(raw) {
        Some(set) => set.into_endpoints(),
        None => vec![raw.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_endpoint_set() {
        let set = decode_endpoints(
            r#"{"kind":"Endpoints","endpoints":["10.0.0.1:80","10.0.0.2:80"]}"#,
        )
        .unwrap();
        assert_eq!(set.kind, "Endpoints");
        assert_eq!(set.endpoints, vec!["10.0.0.1:80", "10.0.0.2:80"]);
    }

    #[test]
    fn reencoding_preserves_order() {
        let raw = r#"{"kind":"Endpoints","endpoints":["c:1","a:2","b:3"]}"#;
        let set = decode_endpoints(raw).unwrap();
        let again = decode_endpoints(&serde_json::to_string(&set).unwrap()).unwrap();
        assert_eq!(again.endpoints, vec!["c:1", "a:2", "b:3"]);
    }

    #[test]
    fn kind_value_is_not_checked() {
        let set = decode_endpoints(r#"{"kind":"","endpoints":[]}"#).unwrap();
        assert!(set.endpoints.is_empty());
        assert_eq!(expand_value(r#"{"kind":"x","endpoints":[]}"#), Vec::<String>::new());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let set = decode_endpoints(
            r#"{"kind":"Endpoints","apiVersion":"v1","endpoints":["h:1"]}"#,
        )
        .unwrap();
        assert_eq!(set.endpoints, vec!["h:1"]);
    }

    #[test]
    fn missing_or_null_fields_decode_as_empty() {
        assert_eq!(expand_value(r#"{"kind":"Endpoints"}"#), Vec::<String>::new());
        assert_eq!(
            expand_value(r#"{"kind":"Endpoints","endpoints":null}"#),
            Vec::<String>::new()
        );
        assert_eq!(expand_value(r#"{"endpoints":["a"]}"#), vec!["a"]);
        assert_eq!(expand_value("{}"), Vec::<String>::new());

        let set = decode_endpoints(r#"{"kind":null,"endpoints":["a"]}"#).unwrap();
        assert_eq!(set.kind, "");
        assert_eq!(set.endpoints, vec!["a"]);
    }

    #[test]
    fn malformed_values_fall_back() {
        for raw in [
            "plain-value",
            "",
            "42",
            "null",
            r#"{"kind":"Endpoints","endpoints":"a"}"#,
            r#"{"kind":"Endpoints","endpoints":[1,2]}"#,
            r#"{"kind":7,"endpoints":["a"]}"#,
            r#"["a","b"]"#,
        ] {
            assert!(decode_endpoints(raw).is_none(), "decoded {:?}", raw);
            assert_eq!(expand_value(raw), vec![raw.to_string()]);
        }
    }
}
