//! Linker errors surfaced to callers
//!
//! Scanning itself never fails; only decoding the host's inputs can.

/// Fatal input errors at the linker boundary
#[derive(Debug, Clone, PartialEq)]
pub enum LinkerError {
    /// Settings object could not be decoded
    InvalidSettings(String),
    /// Descriptor list could not be decoded, so no registry was built
    InvalidDescriptors(String),
}

impl std::fmt::Display for LinkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkerError::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
            LinkerError::InvalidDescriptors(msg) => {
                write!(f, "Candidate registry could not be built: {}", msg)
            }
        }
    }
}

impl std::error::Error for LinkerError {}
