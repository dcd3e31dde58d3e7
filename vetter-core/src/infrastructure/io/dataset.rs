// vetter-core/src/infrastructure/io/dataset.rs

use encoding_rs::Encoding;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::domain::record::{DataFormat, Record};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Ending of the first line; `Lf` when the text has a single unterminated line.
    fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(at) if text[..at].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Line terminators of a dataset file, kept so output matches the input byte layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLayout {
    pub ending: LineEnding,
    /// Whether the last record is followed by a terminator.
    pub trailing: bool,
}

impl Default for LineLayout {
    fn default() -> Self {
        Self {
            ending: LineEnding::Lf,
            trailing: true,
        }
    }
}

/// How rows are split and joined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecOptions {
    pub format: DataFormat,
    pub delimiter: char,
    /// Quote character of delimited data. `None` disables quoting.
    pub quote: Option<char>,
    pub lines: LineLayout,
}

/// Records of a dataset file together with its line layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    pub records: Vec<Record>,
    pub lines: LineLayout,
}

/// Reads a whole dataset into memory.
///
/// A blank line, or a delimited row the reader rejects, is a
/// `MalformedRecord` carrying its 1-based row number.
pub fn read_records(
    path: &Path,
    encoding: &'static Encoding,
    options: &CodecOptions,
) -> Result<Vec<Record>, InfrastructureError> {
    read_dataset(path, encoding, options).map(|dataset| dataset.records)
}

/// Like [`read_records`], also reporting the file's line terminators.
pub fn read_dataset(
    path: &Path,
    encoding: &'static Encoding,
    options: &CodecOptions,
) -> Result<LoadedDataset, InfrastructureError> {
    if !path.exists() {
        return Err(InfrastructureError::DatasetFileNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(InfrastructureError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        });
    }

    if let Some(index) = text.lines().position(|line| line.is_empty()) {
        return Err(InfrastructureError::MalformedRecord { row: index + 1 });
    }

    let records = match options.format {
        DataFormat::Fixed => text
            .lines()
            .map(|line| Record::Fixed(line.to_string()))
            .collect(),
        DataFormat::Csv => parse_delimited(&text, options)?,
    };

    let lines = LineLayout {
        ending: LineEnding::detect(&text),
        trailing: text.ends_with('\n'),
    };
    debug!(path = ?path, rows = records.len(), ?lines, "Dataset loaded");
    Ok(LoadedDataset { records, lines })
}

fn parse_delimited(text: &str, options: &CodecOptions) -> Result<Vec<Record>, InfrastructureError> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(ascii_byte(options.delimiter, "delimiter")?);
    match options.quote {
        Some(quote) => builder.quote(ascii_byte(quote, "quote mark")?),
        None => builder.quoting(false),
    };

    let mut reader = builder.from_reader(text.as_bytes());
    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = result.map_err(|_| InfrastructureError::MalformedRecord { row: index + 1 })?;
        records.push(Record::Delimited(row.iter().map(str::to_string).collect()));
    }
    Ok(records)
}

/// Serializes records in their original layout and encoding.
pub fn encode_records(
    records: &[Record],
    encoding: &'static Encoding,
    options: &CodecOptions,
    path: &Path,
) -> Result<Vec<u8>, InfrastructureError> {
    let text = match options.format {
        DataFormat::Csv => join_delimited(records, options)?,
        DataFormat::Fixed => {
            let mut text = String::new();
            for record in records {
                if let Record::Fixed(line) = record {
                    text.push_str(line);
                    text.push_str(options.lines.ending.as_str());
                }
            }
            text
        }
    };
    let text = if options.lines.trailing {
        text
    } else {
        text.strip_suffix(options.lines.ending.as_str())
            .map(str::to_string)
            .unwrap_or(text)
    };

    let (bytes, _, had_errors) = encoding.encode(&text);
    if had_errors {
        return Err(InfrastructureError::Encode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        });
    }
    Ok(bytes.into_owned())
}

fn join_delimited(records: &[Record], options: &CodecOptions) -> Result<String, InfrastructureError> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .terminator(match options.lines.ending {
            LineEnding::Lf => csv::Terminator::Any(b'\n'),
            LineEnding::CrLf => csv::Terminator::CRLF,
        })
        .delimiter(ascii_byte(options.delimiter, "delimiter")?);
    match options.quote {
        Some(quote) => builder
            .quote(ascii_byte(quote, "quote mark")?)
            .quote_style(csv::QuoteStyle::Always),
        None => builder.quote_style(csv::QuoteStyle::Never),
    };

    let mut writer = builder.from_writer(Vec::new());
    for record in records {
        if let Record::Delimited(columns) = record {
            writer.write_record(columns)?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| InfrastructureError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| InfrastructureError::ConfigError(e.to_string()))
}

pub fn write_records(
    path: &Path,
    records: &[Record],
    encoding: &'static Encoding,
    options: &CodecOptions,
) -> Result<(), InfrastructureError> {
    let bytes = encode_records(records, encoding, options, path)?;
    atomic_write(path, bytes)
}

pub(crate) fn ascii_byte(c: char, what: &str) -> Result<u8, InfrastructureError> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| InfrastructureError::ConfigError(format!("{} '{}' must be an ASCII character", what, c)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use encoding_rs::{SHIFT_JIS, UTF_8};
    use tempfile::tempdir;

    fn csv_options() -> CodecOptions {
        CodecOptions {
            format: DataFormat::Csv,
            delimiter: ',',
            quote: None,
            lines: LineLayout::default(),
        }
    }

    #[test]
    fn test_reads_and_writes_delimited() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("survey.csv");
        fs::write(&path, "001,ABC,05\r\n002,DEF\n")?;

        let records = read_records(&path, UTF_8, &csv_options())?;
        assert_eq!(
            records,
            vec![
                Record::Delimited(vec!["001".into(), "ABC".into(), "05".into()]),
                Record::Delimited(vec!["002".into(), "DEF".into()]),
            ]
        );

        let out = dir.path().join("out.csv");
        write_records(&out, &records, UTF_8, &csv_options())?;
        assert_eq!(fs::read_to_string(out)?, "001,ABC,05\n002,DEF\n");
        Ok(())
    }

    #[test]
    fn test_blank_line_is_malformed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("survey.csv");
        fs::write(&path, "001,ABC,05\n\n003,GHI,07\n")?;

        let err = read_records(&path, UTF_8, &csv_options()).unwrap_err();
        assert!(matches!(err, InfrastructureError::MalformedRecord { row: 2 }));
        Ok(())
    }

    #[test]
    fn test_quoted_output_uses_quote_mark() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("quoted.csv");
        fs::write(&path, "\"001\",\"A,B\"\n")?;
        let options = CodecOptions {
            quote: Some('"'),
            ..csv_options()
        };

        let records = read_records(&path, UTF_8, &options)?;
        assert_eq!(records, vec![Record::Delimited(vec!["001".into(), "A,B".into()])]);

        let bytes = encode_records(&records, UTF_8, &options, &path)?;
        assert_eq!(String::from_utf8(bytes)?, "\"001\",\"A,B\"\n");
        Ok(())
    }

    #[test]
    fn test_fixed_width_round_trip_in_shift_jis() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("survey.dat");
        let (encoded, _, _) = SHIFT_JIS.encode("東京01\n大阪02\n");
        fs::write(&path, &encoded)?;
        let options = CodecOptions {
            format: DataFormat::Fixed,
            ..csv_options()
        };

        let records = read_records(&path, SHIFT_JIS, &options)?;
        assert_eq!(records[1], Record::Fixed("大阪02".into()));

        let bytes = encode_records(&records, SHIFT_JIS, &options, &path)?;
        assert_eq!(bytes, encoded.into_owned());
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = read_records(Path::new("/nonexistent/x.csv"), UTF_8, &csv_options()).unwrap_err();
        assert!(matches!(err, InfrastructureError::DatasetFileNotFound(_)));
    }

    #[test]
    fn test_crlf_fixed_width_keeps_its_terminators() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("survey.dat");
        fs::write(&path, "001ABC05\r\n002DEF07\r\n")?;
        let options = CodecOptions {
            format: DataFormat::Fixed,
            ..csv_options()
        };

        let dataset = read_dataset(&path, UTF_8, &options)?;
        assert_eq!(dataset.records[1], Record::Fixed("002DEF07".into()));
        assert_eq!(dataset.lines.ending, LineEnding::CrLf);

        let mut records = dataset.records;
        records[0] = Record::Fixed("001ABC00".into());
        let options = CodecOptions {
            lines: dataset.lines,
            ..options
        };
        let bytes = encode_records(&records, UTF_8, &options, &path)?;
        assert_eq!(bytes, b"001ABC00\r\n002DEF07\r\n".to_vec());
        Ok(())
    }

    #[test]
    fn test_crlf_delimited_without_final_newline() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("survey.csv");
        fs::write(&path, "001,ABC,05\r\n002,DEF,07")?;

        let dataset = read_dataset(&path, UTF_8, &csv_options())?;
        assert_eq!(
            dataset.lines,
            LineLayout {
                ending: LineEnding::CrLf,
                trailing: false,
            }
        );

        let options = CodecOptions {
            lines: dataset.lines,
            ..csv_options()
        };
        let bytes = encode_records(&dataset.records, UTF_8, &options, &path)?;
        assert_eq!(String::from_utf8(bytes)?, "001,ABC,05\r\n002,DEF,07");
        Ok(())
    }
}
