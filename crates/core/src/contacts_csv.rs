//! Contact CSV import and export.
//!
//! The console's CSV format is deliberately simple: comma-delimited, one
//! header row, no quoting or escaping. Columns are mapped by header name.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::validation::{validate_email, validate_phone};

/// Header names recognised as the phone column, in priority order.
pub const PHONE_HEADERS: &[&str] = &["phone", "mobile", "phone_number", "number", "msisdn"];
/// Header name for the contact's display name.
pub const NAME_HEADER: &str = "name";
/// Header name for the contact's email.
pub const EMAIL_HEADER: &str = "email";

/// Maximum data rows accepted from one upload.
pub const MAX_CSV_ROWS: usize = 100_000;

/// One accepted data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvContactRow {
    /// 1-based line number in the uploaded file.
    pub line: usize,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Every non-reserved column, keyed by its (lowercased) header.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// A data row that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: String,
}

/// Result of parsing an uploaded contact CSV.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<CsvContactRow>,
    pub rejected: Vec<RejectedRow>,
}

impl ParsedCsv {
    /// Number of recipients this file contributes to an audience.
    pub fn audience_count(&self) -> usize {
        self.rows.len()
    }
}

/// Column positions resolved from the header row.
struct ColumnMap {
    phone: usize,
    name: Option<usize>,
    email: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Result<Self, CoreError> {
        let mut seen = BTreeSet::new();
        if let Some(dup) = headers.iter().filter(|h| !h.is_empty()).find(|h| !seen.insert(*h)) {
            return Err(CoreError::Validation(format!(
                "CSV header repeats the column '{dup}'"
            )));
        }

        let position = |name: &str| headers.iter().position(|h| h == name);

        let phone = PHONE_HEADERS
            .iter()
            .find_map(|candidate| position(*candidate))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "CSV header must include a phone column (one of: {})",
                    PHONE_HEADERS.join(", ")
                ))
            })?;

        Ok(Self {
            phone,
            name: position(NAME_HEADER),
            email: position(EMAIL_HEADER),
        })
    }

    fn is_reserved(&self, index: usize) -> bool {
        index == self.phone || Some(index) == self.name || Some(index) == self.email
    }
}

/// Parse contact CSV text.
///
/// Quote characters are ordinary data. Blank lines are skipped and fields are
/// trimmed. Rows with a missing or invalid phone, or an invalid email, are
/// reported in [`ParsedCsv::rejected`] instead of failing the whole upload.
pub fn parse_contacts_csv(text: &str) -> Result<ParsedCsv, CoreError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    // The reader's line counter ignores skipped blank lines, and a record's
    // byte offset can point at the blank lines before it. Lines are counted
    // from the first byte that is not a line terminator.
    let bytes = text.as_bytes();
    let newlines: Vec<usize> = text.match_indices('\n').map(|(i, _)| i).collect();
    let line_at = |offset: u64| {
        let mut start = usize::try_from(offset).unwrap_or(bytes.len()).min(bytes.len());
        while start < bytes.len() && matches!(bytes[start], b'\r' | b'\n') {
            start += 1;
        }
        newlines.partition_point(|&nl| nl < start) + 1
    };

    // Whitespace-only lines come through as a single empty field.
    let mut records = reader.records().filter(|r| match r {
        Ok(record) => !(record.len() == 1 && record.get(0) == Some("")),
        Err(_) => true,
    });

    let header_record = records
        .next()
        .ok_or_else(|| CoreError::Validation("CSV is empty".to_string()))?
        .map_err(malformed)?;
    let headers: Vec<String> = header_record.iter().map(str::to_lowercase).collect();
    if headers.iter().all(String::is_empty) {
        return Err(CoreError::Validation("CSV header row is empty".to_string()));
    }

    let columns = ColumnMap::from_headers(&headers)?;
    let mut parsed = ParsedCsv {
        headers: headers.clone(),
        ..ParsedCsv::default()
    };

    for record in records {
        let record = record.map_err(malformed)?;
        let line_no = record.position().map_or(0, |p| line_at(p.byte()));
        if parsed.rows.len() >= MAX_CSV_ROWS {
            return Err(CoreError::Validation(format!(
                "CSV exceeds the maximum of {MAX_CSV_ROWS} rows"
            )));
        }

        let cell = |i: usize| record.get(i).filter(|v| !v.is_empty());

        let phone = match cell(columns.phone).map(validate_phone) {
            Some(Ok(phone)) => phone,
            Some(Err(e)) => {
                parsed.rejected.push(RejectedRow {
                    line: line_no,
                    reason: e.to_string(),
                });
                continue;
            }
            None => {
                parsed.rejected.push(RejectedRow {
                    line: line_no,
                    reason: "Missing phone number".to_string(),
                });
                continue;
            }
        };

        let email = match columns.email.and_then(cell).map(validate_email) {
            Some(Ok(email)) => Some(email),
            Some(Err(e)) => {
                parsed.rejected.push(RejectedRow {
                    line: line_no,
                    reason: e.to_string(),
                });
                continue;
            }
            None => None,
        };

        let mut attributes = serde_json::Map::new();
        for (i, header) in headers.iter().enumerate() {
            if columns.is_reserved(i) || header.is_empty() {
                continue;
            }
            if let Some(value) = cell(i) {
                attributes.insert(header.clone(), serde_json::Value::String(value.to_string()));
            }
        }

        parsed.rows.push(CsvContactRow {
            line: line_no,
            phone,
            name: columns.name.and_then(cell).map(str::to_string),
            email,
            attributes,
        });
    }

    Ok(parsed)
}

fn malformed(err: csv::Error) -> CoreError {
    let line = err.position().map_or(0, |p| p.line());
    CoreError::Validation(format!("Malformed CSV near line {line}: {err}"))
}

/// A contact as written to an export.
#[derive(Debug, Clone)]
pub struct ExportContact<'a> {
    pub name: Option<&'a str>,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub attributes: &'a serde_json::Map<String, serde_json::Value>,
}

/// Build an export CSV: `name,phone,email` followed by every attribute key
/// seen across the contacts, sorted.
///
/// The format has no quoting, so commas and line breaks inside values are
/// replaced by spaces.
pub fn build_contacts_csv(contacts: &[ExportContact<'_>]) -> Result<String, CoreError> {
    let attribute_keys: BTreeSet<&str> = contacts
        .iter()
        .flat_map(|c| c.attributes.keys().map(String::as_str))
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    let mut header = vec![NAME_HEADER, "phone", EMAIL_HEADER];
    header.extend(attribute_keys.iter().copied());
    writer
        .write_record(header.iter().map(|h| flatten(h)))
        .map_err(export_failed)?;

    for contact in contacts {
        let mut row = vec![
            flatten(contact.name.unwrap_or("")),
            flatten(contact.phone),
            flatten(contact.email.unwrap_or("")),
        ];
        for key in &attribute_keys {
            let value = match contact.attributes.get(*key) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            row.push(flatten(&value));
        }
        writer.write_record(&row).map_err(export_failed)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV export failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Internal(format!("CSV export failed: {e}")))
}

fn flatten(value: &str) -> String {
    value.replace([',', '\r', '\n'], " ")
}

fn export_failed(err: csv::Error) -> CoreError {
    CoreError::Internal(format!("CSV export failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn header_plus_one_row_is_audience_of_one() {
        let parsed = parse_contacts_csv("name,phone\nAsha,+919800000001").unwrap();
        assert_eq!(parsed.audience_count(), 1);
        assert_eq!(parsed.rows[0].phone, "+919800000001");
        assert_eq!(parsed.rows[0].name.as_deref(), Some("Asha"));
        assert_eq!(parsed.rows[0].line, 2);
    }

    #[test]
    fn empty_input_rejected() {
        assert_matches!(parse_contacts_csv(""), Err(CoreError::Validation(_)));
        assert_matches!(parse_contacts_csv("\n\n"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_header_rejected() {
        let err = parse_contacts_csv(" , ,\n1,2").unwrap_err();
        assert!(err.to_string().contains("header row is empty"));
    }

    #[test]
    fn missing_phone_column_rejected() {
        let err = parse_contacts_csv("name,email\nAsha,a@example.com").unwrap_err();
        assert!(err.to_string().contains("phone column"));
    }

    #[test]
    fn header_matching_is_case_insensitive_with_aliases() {
        let parsed = parse_contacts_csv("Full Name, MOBILE ,Email\nx,9876543210,X@Y.io").unwrap();
        assert_eq!(parsed.headers, vec!["full name", "mobile", "email"]);
        let row = &parsed.rows[0];
        assert_eq!(row.phone, "9876543210");
        assert_eq!(row.email.as_deref(), Some("x@y.io"));
        assert_eq!(row.name, None);
        assert_eq!(row.attributes["full name"], "x");
    }

    #[test]
    fn extra_columns_become_attributes() {
        let parsed = parse_contacts_csv("phone,name,order_id,city\n5550100123,Ravi,A-9,\n").unwrap();
        let row = &parsed.rows[0];
        assert_eq!(row.attributes.len(), 1);
        assert_eq!(row.attributes["order_id"], "A-9");
    }

    #[test]
    fn invalid_rows_are_rejected_not_fatal() {
        let csv = "phone,email\r\n5550100123,ok@example.com\r\n,a@b.com\r\nabc,\r\n5550100999,bad\r\n";
        let parsed = parse_contacts_csv(csv).unwrap();
        assert_eq!(parsed.audience_count(), 1);
        let lines: Vec<usize> = parsed.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(parsed.rejected[0].reason, "Missing phone number");
    }

    #[test]
    fn blank_lines_skipped_and_line_numbers_kept() {
        let parsed = parse_contacts_csv("phone\n\n5550100123\n\n5550100456").unwrap();
        let lines: Vec<usize> = parsed.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn repeated_header_is_rejected() {
        let err = parse_contacts_csv("phone,Phone\n5550100123,5550100456").unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("'phone'"));
    }

    #[test]
    fn line_numbers_count_blank_and_whitespace_lines() {
        let csv = "name,phone\r\n\r\nAsha,abc\r\n   \r\n\r\nRavi,\r\nMeera,5550100123";
        let parsed = parse_contacts_csv(csv).unwrap();
        let rejected: Vec<usize> = parsed.rejected.iter().map(|r| r.line).collect();
        assert_eq!(rejected, vec![3, 6]);
        assert_eq!(parsed.rows[0].line, 7);
    }

    #[test]
    fn quotes_are_plain_data() {
        let parsed = parse_contacts_csv("name,phone\n\"Rao,5550100123").unwrap();
        assert_eq!(parsed.rows[0].name.as_deref(), Some("\"Rao"));
        assert_eq!(parsed.rows[0].phone, "5550100123");
    }

    #[test]
    fn byte_order_mark_ignored() {
        let parsed = parse_contacts_csv("\u{feff}phone\n5550100123").unwrap();
        assert_eq!(parsed.headers, vec!["phone"]);
        assert_eq!(parsed.audience_count(), 1);
    }

    #[test]
    fn export_writes_header_and_sorted_attributes() {
        let mut a = serde_json::Map::new();
        a.insert("tier".into(), serde_json::json!("gold"));
        let mut b = serde_json::Map::new();
        b.insert("city".into(), serde_json::json!("Pune, MH"));
        b.insert("points".into(), serde_json::json!(10));

        let csv = build_contacts_csv(&[
            ExportContact {
                name: Some("Asha"),
                phone: "+919800000001",
                email: None,
                attributes: &a,
            },
            ExportContact {
                name: None,
                phone: "+919800000002",
                email: Some("b@example.com"),
                attributes: &b,
            },
        ])
        .unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "name,phone,email,city,points,tier");
        assert_eq!(lines[1], "Asha,+919800000001,,,,gold");
        assert_eq!(lines[2], ",+919800000002,b@example.com,Pune  MH,10,");
    }

    #[test]
    fn exported_csv_parses_back() {
        let attrs = serde_json::Map::new();
        let csv = build_contacts_csv(&[ExportContact {
            name: Some("Ravi"),
            phone: "5550100123",
            email: Some("ravi@example.com"),
            attributes: &attrs,
        }])
        .unwrap();
        let parsed = parse_contacts_csv(&csv).unwrap();
        assert_eq!(parsed.audience_count(), 1);
        assert_eq!(parsed.rows[0].name.as_deref(), Some("Ravi"));
    }
}
