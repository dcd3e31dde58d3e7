// vetter-core/src/infrastructure/io/encoding.rs

use encoding_rs::Encoding;

use crate::error::VetterError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::EncodingResolver;

/// Resolves WHATWG encoding labels ("utf-8", "shift_jis", "windows-1252", ...).
#[derive(Debug, Default, Clone, Copy)]
pub struct LabelEncodingResolver;

impl EncodingResolver for LabelEncodingResolver {
    fn encoding_for(&self, name: &str) -> Result<&'static Encoding, VetterError> {
        Encoding::for_label(name.trim().as_bytes())
            .ok_or_else(|| InfrastructureError::UnknownEncoding(name.to_string()).into())
    }
}
