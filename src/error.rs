use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

/// Library error type for viewer operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The source cannot produce RGBA8 pixels.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// A shader failed to compile.
    #[error("shader compilation failed:\n{log}")]
    ShaderCompile { log: String },

    /// The shader pair failed to link into a pipeline.
    #[error("program link failed:\n{log}")]
    ProgramLink { log: String },

    /// A GPU object could not be created.
    #[error("could not create GPU resource: {0}")]
    ResourceCreation(String),

    /// `current()` was called before any image was loaded.
    #[error("history is empty: no image has been loaded")]
    EmptyHistory,

    /// An image file could not be decoded.
    #[error("could not decode {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    /// A decode completed after a newer request superseded it.
    #[error("decode superseded: {0}")]
    DecodeAborted(String),

    /// The configuration file failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

/// Collects user-facing failures into a displayable, dismissible list.
///
/// GPU setup and decode problems are pushed here instead of being thrown past
/// the UI boundary, so the viewer keeps running with whatever subset of
/// resources succeeded. Handles are cheap clones sharing one list and are
/// confined to the UI thread.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    messages: Rc<RefCell<Vec<String>>>,
}

impl ErrorSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for display and mirror it to the log.
    pub fn push(&self, error: &Error) {
        tracing::error!(%error, "viewer error");
        self.messages.borrow_mut().push(error.to_string());
    }

    /// Record a bare message for display.
    pub fn push_message(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(%message, "viewer error");
        self.messages.borrow_mut().push(message);
    }

    /// Current list of messages, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    /// Clear every pending message.
    pub fn dismiss(&self) {
        self.messages.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_collects_and_dismisses() {
        let sink = ErrorSink::new();
        assert!(sink.is_empty());

        sink.push(&Error::EmptyHistory);
        sink.push_message("texture upload failed");

        let shared = sink.clone();
        assert_eq!(shared.snapshot().len(), 2);
        assert!(shared.snapshot()[0].contains("history is empty"));

        sink.dismiss();
        assert!(shared.is_empty());
    }
}
