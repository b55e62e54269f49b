//! Message template variables: extraction, mapping, and preview rendering.
//!
//! Templates embed `{{variable}}` tokens. A campaign maps each variable to a
//! [`VariableSource`] which is resolved per recipient before rendering.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::channels::Channel;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Regex pattern matching `{{variable}}` tokens. Whitespace inside the braces
/// is tolerated; the variable name is captured in group 1.
pub const VARIABLE_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VARIABLE_PATTERN).expect("valid regex"));

/// Maximum SMS body length in characters (multi-part messages included).
pub const MAX_SMS_BODY_LENGTH: usize = 1_000;
/// Maximum RCS text body length in characters.
pub const MAX_RCS_BODY_LENGTH: usize = 2_500;
/// Maximum WhatsApp template body length in characters.
pub const MAX_WHATSAPP_BODY_LENGTH: usize = 1_024;

/// Septets in a single-part GSM-7 SMS.
const GSM_SINGLE_SEGMENT: usize = 160;
/// Septets per part once a GSM-7 message is split (UDH takes the rest).
const GSM_MULTI_SEGMENT: usize = 153;
/// Characters in a single-part UCS-2 SMS.
const UCS2_SINGLE_SEGMENT: usize = 70;
/// Characters per part of a multi-part UCS-2 SMS.
const UCS2_MULTI_SEGMENT: usize = 67;

/// GSM-7 extension table characters; each costs two septets.
const GSM_EXTENSION_CHARS: &[char] = &['^', '{', '}', '\\', '[', ']', '~', '|', '€'];

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract the `{{variable}}` names used in `body`.
///
/// Names are de-duplicated and returned in order of first appearance.
pub fn extract_variables(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    VARIABLE_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Variables used in `body` that have no entry in `mapping`.
pub fn unmapped_variables(body: &str, mapping: &VariableMapping) -> Vec<String> {
    extract_variables(body)
        .into_iter()
        .filter(|name| !mapping.contains_key(name))
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Maximum body length accepted for a channel.
pub fn max_body_length(channel: Channel) -> usize {
    match channel {
        Channel::Sms => MAX_SMS_BODY_LENGTH,
        Channel::Rcs => MAX_RCS_BODY_LENGTH,
        Channel::Whatsapp => MAX_WHATSAPP_BODY_LENGTH,
    }
}

/// Validate a message body for a channel: non-blank and within the length cap.
pub fn validate_body(channel: Channel, body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation(
            "Message body must not be empty".to_string(),
        ));
    }
    let max = max_body_length(channel);
    let len = body.chars().count();
    if len > max {
        return Err(CoreError::Validation(format!(
            "Message body exceeds maximum length of {max} characters for {channel} (got {len})"
        )));
    }
    Ok(())
}

/// Number of SMS parts `text` occupies once sent.
///
/// Bodies made only of GSM-7 characters use 160/153 septet parts; anything
/// else is sent as UCS-2 with 70/67 character parts.
pub fn sms_segment_count(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let (units, single, multi) = if text.chars().all(is_gsm7) {
        let septets = text
            .chars()
            .map(|c| if GSM_EXTENSION_CHARS.contains(&c) { 2 } else { 1 })
            .sum();
        (septets, GSM_SINGLE_SEGMENT, GSM_MULTI_SEGMENT)
    } else {
        (text.chars().count(), UCS2_SINGLE_SEGMENT, UCS2_MULTI_SEGMENT)
    };

    if units <= single {
        1
    } else {
        units.div_ceil(multi)
    }
}

fn is_gsm7(c: char) -> bool {
    c == '\n' || c == '\r' || c == '€' || (c.is_ascii() && !c.is_ascii_control() && c != '`')
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Built-in contact fields a variable can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Phone,
    Email,
}

/// Where a template variable takes its value from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum VariableSource {
    /// A built-in contact field.
    Field(ContactField),
    /// A contact attribute, usually an extra CSV column.
    Attribute(String),
    /// The same fixed text for every recipient.
    Literal(String),
}

/// Variable name to value source. Stored as JSONB on campaigns.
pub type VariableMapping = BTreeMap<String, VariableSource>;

/// The contact data a mapping is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct RecipientFields<'a> {
    pub name: Option<&'a str>,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub attributes: &'a serde_json::Map<String, serde_json::Value>,
}

/// Resolve every mapped variable for one recipient.
///
/// Variables whose source has no value for this recipient are omitted, so
/// [`render`] leaves their token in place.
pub fn resolve_values(
    mapping: &VariableMapping,
    recipient: &RecipientFields<'_>,
) -> HashMap<String, String> {
    mapping
        .iter()
        .filter_map(|(name, source)| {
            let value = match source {
                VariableSource::Field(ContactField::Name) => recipient.name.map(str::to_string),
                VariableSource::Field(ContactField::Phone) => Some(recipient.phone.to_string()),
                VariableSource::Field(ContactField::Email) => recipient.email.map(str::to_string),
                VariableSource::Attribute(key) => {
                    recipient.attributes.get(key).and_then(attribute_text)
                }
                VariableSource::Literal(text) => Some(text.clone()),
            };
            value.map(|v| (name.clone(), v))
        })
        .collect()
}

fn attribute_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Substitute variable values into `body`.
///
/// Tokens without a value are left untouched.
pub fn render(body: &str, values: &HashMap<String, String>) -> String {
    VARIABLE_RE
        .replace_all(body, |caps: &Captures<'_>| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // -- extract_variables --

    #[test]
    fn extracts_variables_in_order() {
        let vars = extract_variables("Hi {{name}}, your order {{order_id}} shipped");
        assert_eq!(vars, vec!["name", "order_id"]);
    }

    #[test]
    fn duplicates_are_removed() {
        let vars = extract_variables("{{b}} {{a}} {{b}} {{ a }}");
        assert_eq!(vars, vec!["b", "a"]);
    }

    #[test]
    fn single_braces_and_invalid_names_ignored() {
        let vars = extract_variables("{name} {{1abc}} {{ }} {{ok_2}}");
        assert_eq!(vars, vec!["ok_2"]);
    }

    #[test]
    fn no_variables_yields_empty() {
        assert!(extract_variables("Plain text").is_empty());
    }

    // -- unmapped_variables --

    #[test]
    fn unmapped_lists_missing_only() {
        let mut mapping = VariableMapping::new();
        mapping.insert("name".into(), VariableSource::Field(ContactField::Name));
        let missing = unmapped_variables("{{name}} {{code}}", &mapping);
        assert_eq!(missing, vec!["code"]);
    }

    // -- validate_body --

    #[test]
    fn blank_body_rejected() {
        let err = validate_body(Channel::Sms, "   ").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn body_length_is_channel_specific() {
        let body = "x".repeat(MAX_WHATSAPP_BODY_LENGTH + 1);
        assert!(validate_body(Channel::Rcs, &body).is_ok());
        let err = validate_body(Channel::Whatsapp, &body).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum length"));
    }

    #[test]
    fn body_at_limit_passes() {
        let body = "x".repeat(MAX_SMS_BODY_LENGTH);
        assert!(validate_body(Channel::Sms, &body).is_ok());
    }

    // -- sms_segment_count --

    #[test]
    fn gsm_segments() {
        assert_eq!(sms_segment_count(""), 0);
        assert_eq!(sms_segment_count(&"a".repeat(160)), 1);
        assert_eq!(sms_segment_count(&"a".repeat(161)), 2);
        assert_eq!(sms_segment_count(&"a".repeat(306)), 2);
        assert_eq!(sms_segment_count(&"a".repeat(307)), 3);
    }

    #[test]
    fn extension_chars_count_double() {
        // 80 braces = 160 septets, still one part.
        assert_eq!(sms_segment_count(&"{".repeat(80)), 1);
        assert_eq!(sms_segment_count(&"{".repeat(81)), 2);
    }

    #[test]
    fn unicode_uses_ucs2_segments() {
        assert_eq!(sms_segment_count(&"é".repeat(70)), 1);
        assert_eq!(sms_segment_count(&"é".repeat(71)), 2);
    }

    // -- resolve_values / render --

    #[test]
    fn resolves_fields_attributes_and_literals() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("order_id".into(), serde_json::json!("A-17"));
        attributes.insert("points".into(), serde_json::json!(42));
        let recipient = RecipientFields {
            name: Some("Asha"),
            phone: "+919800000001",
            email: None,
            attributes: &attributes,
        };

        let mut mapping = VariableMapping::new();
        mapping.insert("name".into(), VariableSource::Field(ContactField::Name));
        mapping.insert("order_id".into(), VariableSource::Attribute("order_id".into()));
        mapping.insert("points".into(), VariableSource::Attribute("points".into()));
        mapping.insert("brand".into(), VariableSource::Literal("Acme".into()));
        mapping.insert("email".into(), VariableSource::Field(ContactField::Email));

        let resolved = resolve_values(&mapping, &recipient);
        assert_eq!(resolved["name"], "Asha");
        assert_eq!(resolved["order_id"], "A-17");
        assert_eq!(resolved["points"], "42");
        assert_eq!(resolved["brand"], "Acme");
        assert!(!resolved.contains_key("email"));
    }

    #[test]
    fn render_substitutes_known_and_keeps_unknown() {
        let out = render(
            "Hi {{ name }}, order {{order_id}} via {{carrier}}",
            &values(&[("name", "Asha"), ("order_id", "A-17")]),
        );
        assert_eq!(out, "Hi Asha, order A-17 via {{carrier}}");
    }

    #[test]
    fn variable_source_json_shape() {
        let source: VariableSource =
            serde_json::from_str(r#"{"source":"field","value":"phone"}"#).unwrap();
        assert_eq!(source, VariableSource::Field(ContactField::Phone));
        let source: VariableSource =
            serde_json::from_str(r#"{"source":"literal","value":"Hello"}"#).unwrap();
        assert_eq!(source, VariableSource::Literal("Hello".into()));
    }
}
