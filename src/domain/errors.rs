use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// The host could not display the new text
    RenderFailed { id: String, reason: String },
    InvalidDefinition(String),
    DuplicateId(String),
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetError::RenderFailed { id, reason } => {
                write!(f, "Failed to render target {}: {}", id, reason)
            }
            TargetError::InvalidDefinition(msg) => write!(f, "Invalid target: {}", msg),
            TargetError::DuplicateId(id) => write!(f, "Duplicate target id: {}", id),
        }
    }
}

impl std::error::Error for TargetError {}
