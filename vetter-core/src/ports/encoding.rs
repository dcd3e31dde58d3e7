// vetter-core/src/ports/encoding.rs

use encoding_rs::Encoding;

use crate::error::VetterError;

pub trait EncodingResolver: Send + Sync {
    fn encoding_for(&self, name: &str) -> Result<&'static Encoding, VetterError>;
}
