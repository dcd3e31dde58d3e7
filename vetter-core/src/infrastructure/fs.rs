use crate::domain::record::DataFormat;
use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// The temporary file lives in the target directory and is renamed over the
/// target path, so readers never see a half-written dataset or report.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Output file name. Delimited names without an extension get `default_ext`.
pub fn output_file_name(name: &str, format: DataFormat, default_ext: &str) -> String {
    let has_extension = Path::new(name).extension().is_some();
    match format {
        DataFormat::Csv if !has_extension => format!("{}.{}", name, default_ext),
        _ => name.to_string(),
    }
}
