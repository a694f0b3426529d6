//! Canonical JSON encoding for fingerprint input.
//!
//! Object keys are sorted recursively and no whitespace is emitted, so two
//! payloads that differ only in key insertion order encode to the same bytes.

use serde_json::Value;

/// Trait for canonical serialization
pub trait CanonicalEncode {
    /// Append the canonical form to `out`
    fn encode_into(&self, out: &mut String);

    /// Encode to a canonical string
    fn canonical(&self) -> String {
        let mut out = String::new();
        self.encode_into(&mut out);
        out
    }
}

impl CanonicalEncode for Value {
    fn encode_into(&self, out: &mut String) {
        match self {
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.encode_into(out);
                }
                out.push(']');
            }
            Value::Object(map) => {
                encode_object(map.iter(), out);
            }
            // Scalars already have a single compact rendering
            scalar => out.push_str(&scalar.to_string()),
        }
    }
}

/// Encode key/value pairs as a JSON object with sorted keys
pub fn encode_object<'a, I>(entries: I, out: &mut String)
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut sorted: Vec<_> = entries.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::from(key.as_str()).to_string());
        out.push(':');
        value.encode_into(out);
    }
    out.push('}');
}
