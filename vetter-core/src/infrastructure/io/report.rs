// vetter-core/src/infrastructure/io/report.rs

use encoding_rs::Encoding;
use std::path::Path;

use crate::domain::ledger::{REPORT_HEADERS, ViolationEntry};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::io::dataset::ascii_byte;

/// Renders the violation report: a header row, then one row per entry.
pub fn render_report(entries: &[ViolationEntry], delimiter: char) -> Result<String, InfrastructureError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .delimiter(ascii_byte(delimiter, "delimiter")?)
        .from_writer(Vec::new());

    writer.write_record(REPORT_HEADERS)?;
    for entry in entries {
        writer.serialize(entry)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| InfrastructureError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| InfrastructureError::ConfigError(e.to_string()))
}

pub fn write_report(
    path: &Path,
    entries: &[ViolationEntry],
    encoding: &'static Encoding,
    delimiter: char,
) -> Result<(), InfrastructureError> {
    let text = render_report(entries, delimiter)?;
    let (bytes, _, had_errors) = encoding.encode(&text);
    if had_errors {
        return Err(InfrastructureError::Encode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        });
    }
    atomic_write(path, bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_report_columns_and_empty_fields() {
        let entries = vec![
            ViolationEntry {
                rule_number: Some(1),
                rule_summary: "code, off-code".into(),
                row_number: Some(1),
                replaced_position: Some(3),
                replaced_name: "code".into(),
                input_value: "05".into(),
                replacement_value: "00".into(),
                error_flag: "ERR1".into(),
                message: String::new(),
            },
            ViolationEntry::abort("Metadata set 9 was not found"),
        ];

        let report = render_report(&entries, ',').unwrap();
        insta::assert_snapshot!(report.trim_end(), @r###"
        rule_number,rule_summary,row_number,replaced_position,replaced_name,input_value,replacement_value,error_flag,message
        1,"code, off-code",1,3,code,05,00,ERR1,
        ,,,,,,,,Metadata set 9 was not found
        "###);
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let report = render_report(&[], ';').unwrap();
        assert_eq!(report.lines().count(), 1);
        assert!(report.starts_with("rule_number;rule_summary;"));
    }
}
