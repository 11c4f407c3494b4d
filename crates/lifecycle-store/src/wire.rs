//! Lifecycle XML wire codec
//!
//! The S3 lifecycle API exchanges `<LifecycleConfiguration>` XML while the
//! rest of this tool works on JSON documents. The mapping is deterministic
//! in both directions:
//!
//! - the `Rules` array maps to repeated `<Rule>` elements under the root
//! - object keys map to child elements, emitted in sorted key order
//! - arrays map to repeated same-named elements; `Rule`, `Transition`,
//!   `NoncurrentVersionTransition` and `Tag` always parse back as arrays
//! - a fixed table of known integer and boolean leaf fields restores JSON
//!   types on parse; every other leaf parses as a string
//!
//! Round-tripping `to_xml` then `from_xml` is the identity on documents that
//! follow these typing conventions, which is what post-publish verification
//! relies on.

use serde_json::{Map, Value};

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use lifecycle_policy::PolicyDocument;
use lifecycle_policy::document::RULES_KEY;

use crate::error::{Result, StoreError};

const ROOT: &str = "LifecycleConfiguration";
const RULE_ELEMENT: &str = "Rule";

/// Element names that always parse as arrays, even with a single occurrence
const ALWAYS_ARRAY: [&str; 4] = [
    RULE_ELEMENT,
    "Transition",
    "NoncurrentVersionTransition",
    "Tag",
];

/// Leaf fields restored as JSON integers
const INTEGER_FIELDS: [&str; 6] = [
    "Days",
    "NoncurrentDays",
    "NewerNoncurrentVersions",
    "ObjectSizeGreaterThan",
    "ObjectSizeLessThan",
    "DaysAfterInitiation",
];

/// Leaf fields restored as JSON booleans
const BOOLEAN_FIELDS: [&str; 1] = ["ExpiredObjectDeleteMarker"];

/// Container elements restored as empty objects when childless, so that an
/// empty `Filter: {}` survives a round trip instead of collapsing to `""`
const OBJECT_FIELDS: [&str; 5] = [
    "Filter",
    "And",
    "Expiration",
    "NoncurrentVersionExpiration",
    "AbortIncompleteMultipartUpload",
];

/// Serialize a policy document to lifecycle XML
pub fn to_xml(policy: &PolicyDocument) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    write_start(&mut writer, ROOT)?;

    if let Some(object) = policy.as_value().as_object() {
        for key in sorted_keys(object) {
            if key == RULES_KEY {
                if let Some(rules) = object[key].as_array() {
                    for rule in rules {
                        write_value(&mut writer, RULE_ELEMENT, rule)?;
                    }
                }
            } else {
                write_value(&mut writer, key, &object[key])?;
            }
        }
    }

    write_end(&mut writer, ROOT)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| StoreError::wire(format!("produced non-UTF-8 XML: {}", e)))
}

/// Parse lifecycle XML into a policy document
pub fn from_xml(xml: &str) -> Result<PolicyDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let root = loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => break element_name(&e)?,
            Ok(Event::Empty(e)) => {
                // <LifecycleConfiguration/> with no rules at all.
                let name = element_name(&e)?;
                expect_root(&name)?;
                return empty_document();
            }
            Ok(Event::Eof) => return Err(StoreError::wire("empty lifecycle document")),
            Ok(Event::Decl(_)) | Ok(Event::Comment(_)) | Ok(Event::Text(_)) => {}
            Ok(other) => {
                return Err(StoreError::wire(format!(
                    "unexpected XML event before root: {:?}",
                    other
                )));
            }
            Err(e) => return Err(StoreError::wire(e.to_string())),
        }
    };
    expect_root(&root)?;

    let mut value = parse_element(&mut reader, &root)?;

    // The root's repeated <Rule> children become the "Rules" array; an empty
    // or rule-less configuration still carries the key.
    let Some(object) = value.as_object_mut() else {
        return empty_document();
    };
    let rules = object
        .remove(RULE_ELEMENT)
        .unwrap_or_else(|| Value::Array(Vec::new()));
    object.insert(RULES_KEY.to_string(), rules);

    PolicyDocument::from_value(value).map_err(|e| StoreError::wire(e.to_string()))
}

/// Extract the `<Code>` of an S3 error response body, if one is present
pub fn error_code(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_code = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => in_code = e.name().as_ref() == b"Code",
            Ok(Event::Text(t)) if in_code => {
                return t.unescape().ok().map(|s| s.into_owned());
            }
            Ok(Event::End(_)) => in_code = false,
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

fn empty_document() -> Result<PolicyDocument> {
    PolicyDocument::from_value(serde_json::json!({ RULES_KEY: [] }))
        .map_err(|e| StoreError::wire(e.to_string()))
}

fn expect_root(name: &str) -> Result<()> {
    if name == ROOT {
        Ok(())
    } else {
        Err(StoreError::wire(format!(
            "expected <{}> root, got <{}>",
            ROOT, name
        )))
    }
}

fn element_name(e: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|e| StoreError::wire(e.to_string()))
}

fn sorted_keys(object: &Map<String, Value>) -> Vec<&String> {
    let mut keys: Vec<&String> = object.keys().collect();
    keys.sort_unstable();
    keys
}

fn write_start(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| StoreError::wire(e.to_string()))
}

fn write_end(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| StoreError::wire(e.to_string()))
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| StoreError::wire(e.to_string()))
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => {
            for item in items {
                write_value(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(object) => {
            write_start(writer, name)?;
            for key in sorted_keys(object) {
                write_value(writer, key, &object[key])?;
            }
            write_end(writer, name)
        }
        Value::String(s) => {
            write_start(writer, name)?;
            write_text(writer, s)?;
            write_end(writer, name)
        }
        Value::Number(n) => {
            write_start(writer, name)?;
            write_text(writer, &n.to_string())?;
            write_end(writer, name)
        }
        Value::Bool(b) => {
            write_start(writer, name)?;
            write_text(writer, if *b { "true" } else { "false" })?;
            write_end(writer, name)
        }
    }
}

fn parse_element(reader: &mut Reader<&[u8]>, name: &str) -> Result<Value> {
    let mut children: Vec<(String, Value)> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let child = element_name(&e)?;
                let value = parse_element(reader, &child)?;
                children.push((child, value));
            }
            Ok(Event::Empty(e)) => {
                let child = element_name(&e)?;
                let value = childless_value(&child);
                children.push((child, value));
            }
            Ok(Event::Text(t)) => {
                text.push_str(
                    &t.unescape()
                        .map_err(|e| StoreError::wire(e.to_string()))?,
                );
            }
            Ok(Event::End(e)) if e.name().as_ref() == name.as_bytes() => break,
            Ok(Event::End(e)) => {
                return Err(StoreError::wire(format!(
                    "mismatched closing tag inside <{}>: </{}>",
                    name,
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            Ok(Event::Eof) => {
                return Err(StoreError::wire(format!("unterminated <{}> element", name)));
            }
            Ok(Event::Comment(_)) | Ok(Event::CData(_)) | Ok(Event::Decl(_))
            | Ok(Event::PI(_)) | Ok(Event::DocType(_)) => {}
            Err(e) => return Err(StoreError::wire(e.to_string())),
        }
    }

    if children.is_empty() {
        let text = text.trim();
        if text.is_empty() {
            Ok(childless_value(name))
        } else {
            Ok(typed_leaf(name, text))
        }
    } else {
        Ok(assemble_object(children))
    }
}

/// Value of an element with no children and no text
fn childless_value(name: &str) -> Value {
    if OBJECT_FIELDS.contains(&name) {
        Value::Object(Map::new())
    } else {
        typed_leaf(name, "")
    }
}

/// Collect parsed children into an object, collapsing singletons except for
/// the element names that are arrays by convention.
fn assemble_object(children: Vec<(String, Value)>) -> Value {
    let mut map: Map<String, Value> = Map::new();
    for (name, value) in children {
        match map.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                map.insert(name, Value::Array(vec![value]));
            }
        }
    }

    let collapsed: Map<String, Value> = map
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::Array(mut items)
                    if items.len() == 1 && !ALWAYS_ARRAY.contains(&name.as_str()) =>
                {
                    items.remove(0)
                }
                other => other,
            };
            (name, value)
        })
        .collect();

    Value::Object(collapsed)
}

/// Restore the JSON type of a leaf by its element name
fn typed_leaf(name: &str, text: &str) -> Value {
    if INTEGER_FIELDS.contains(&name)
        && let Ok(n) = text.parse::<i64>()
    {
        return Value::from(n);
    }
    if BOOLEAN_FIELDS.contains(&name) {
        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::String(text.to_string())
}
