//! Content-type detection from the leading bytes of a file. The filename
//! extension is deliberately ignored; only the binary signature counts.

#[derive(Debug)]
pub enum SniffError {
    /// The content matched no known binary signature. Callers treat this as
    /// a per-file failure rather than guessing a generic type.
    UnknownSignature,
}

/// Sniffs the MIME type from the content's magic bytes.
pub fn detect_content_type(bytes: &[u8]) -> Result<&'static str, SniffError> {
    match infer::get(bytes) {
        Some(kind) => Ok(kind.mime_type()),
        None => Err(SniffError::UnknownSignature),
    }
}
