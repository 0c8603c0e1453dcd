// # Document Codec
//
// Converts a Registry to and from the address document kept on the
// store.
//
// ## Format
//
// ```json
// {
//     "addresses": [
//         {
//             "domain": "a.com",
//             "ip": "1.2.3.4"
//         }
//     ]
// }
// ```
//
// ## Decoding rules
//
// - Empty text is an empty registry (fresh remote path)
// - Text that is not a JSON object is rejected
// - Individual records that are incomplete, mistyped, or that would break
//   a registry invariant are dropped; the first occurrence of a domain or
//   address wins
//
// Older clients wrote strings without escaping. A raw backslash in such a
// document (`"corp\hosts"`) is invalid JSON and the whole document is
// rejected, so every menu action fails until the file is repaired by hand.
// A sequence that happens to be a valid escape (`\f`, `\n`) decodes to the
// control character instead and is written back escaped.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};
use crate::registry::Registry;

/// Indentation used by the encoder
const INDENT: &[u8] = b"    ";

/// One `{domain, ip}` pair inside the document
#[derive(Debug, Serialize, Deserialize)]
struct AddressRecord<'a> {
    domain: std::borrow::Cow<'a, str>,
    ip: std::borrow::Cow<'a, str>,
}

/// Document as written by the encoder
#[derive(Debug, Serialize)]
struct DocumentOut<'a> {
    addresses: Vec<AddressRecord<'a>>,
}

/// Decode document text into a registry
pub fn decode(text: &str) -> Result<Registry> {
    let mut registry = Registry::new();

    if text.trim().is_empty() {
        tracing::debug!("Empty document, starting with an empty registry");
        return Ok(registry);
    }

    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Error::document(format!("not valid JSON: {}", e)))?;

    let mut document = match value {
        serde_json::Value::Object(document) => document,
        other => {
            return Err(Error::document(format!(
                "expected an object, found {}",
                json_kind(&other)
            )));
        }
    };

    // Records are checked one by one so a bad entry only costs itself
    let records = match document.remove("addresses") {
        Some(serde_json::Value::Array(records)) => records,
        Some(serde_json::Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(Error::document(format!(
                "`addresses` must be an array, found {}",
                json_kind(&other)
            )));
        }
    };

    let total = records.len();
    for (index, value) in records.into_iter().enumerate() {
        let record = match AddressRecord::deserialize(&value) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("Dropping record #{}: {}", index, e);
                continue;
            }
        };

        if let Err(e) = registry.add(record.domain.into_owned(), record.ip.into_owned()) {
            tracing::debug!("Dropping record #{}: {}", index, e);
        }
    }

    if registry.len() != total {
        tracing::debug!("Decoded {} of {} records", registry.len(), total);
    }

    Ok(registry)
}

/// Encode a registry as document text
pub fn encode(registry: &Registry) -> Result<String> {
    let document = DocumentOut {
        addresses: registry
            .list()
            .map(|(domain, ip)| AddressRecord {
                domain: domain.into(),
                ip: ip.into(),
            })
            .collect(),
    };

    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));

    document.serialize(&mut serializer)?;

    String::from_utf8(out)
        .map_err(|e| Error::document(format!("encoded document is not UTF-8: {}", e)))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
