/// Convenience result type used across focus-rsvp.
pub type RsvpResult<T> = Result<T, RsvpError>;

/// Top-level error taxonomy used by reader, renderer and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum RsvpError {
    /// A settings value lies outside its documented bounds.
    #[error("config out of range: {0}")]
    ConfigOutOfRange(String),

    /// Export was requested for an empty word sequence.
    #[error("nothing to export: the word sequence is empty")]
    NothingToExport,

    /// The host cannot record video (encoder missing or format unsupported).
    #[error("export unavailable: {0}")]
    ExportUnavailable(String),

    /// Another export is still running on the same exporter.
    #[error("an export is already in progress")]
    ExportBusy,

    /// The export was cancelled before the artifact was finalized.
    #[error("export cancelled")]
    ExportCancelled,

    /// The recording sink failed while capturing or finalizing.
    #[error("recording sink failure: {0}")]
    SinkFailure(String),

    /// Surface allocation, font loading or text shaping failed.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RsvpError {
    /// Build a [`RsvpError::ConfigOutOfRange`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigOutOfRange(msg.into())
    }

    /// Build a [`RsvpError::ExportUnavailable`] value.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ExportUnavailable(msg.into())
    }

    /// Build a [`RsvpError::SinkFailure`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::SinkFailure(msg.into())
    }

    /// Build a [`RsvpError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
