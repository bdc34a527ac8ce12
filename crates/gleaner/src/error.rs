// ABOUTME: Error types for gleaner including the ErrorCode enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    EmptyInput,
    NoReadableContent,
    Io,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::EmptyInput => "empty input",
            ErrorCode::NoReadableContent => "no readable content",
            ErrorCode::Io => "io error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gleaner: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create an EmptyInput error.
    pub fn empty_input(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::EmptyInput, url, op, None)
    }

    /// Create a NoReadableContent error.
    ///
    /// The clustering engine has no notion of the document URL, so it raises
    /// this with an empty url; callers attach one with [`ExtractError::with_url`].
    pub fn no_readable_content(op: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NoReadableContent,
            String::new(),
            op,
            Some(anyhow::anyhow!("candidate pool is empty")),
        )
    }

    /// Create an Io error.
    pub fn io(url: impl Into<String>, op: impl Into<String>, source: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, url, op, Some(source.into()))
    }

    /// Attach the document URL when the error was raised without one.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        if self.url.is_empty() {
            self.url = url.into();
        }
        self
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is an EmptyInput error.
    pub fn is_empty_input(&self) -> bool {
        self.code == ErrorCode::EmptyInput
    }

    /// Returns true if this is a NoReadableContent error.
    pub fn is_no_readable_content(&self) -> bool {
        self.code == ErrorCode::NoReadableContent
    }

    /// Returns true if this is an Io error.
    pub fn is_io(&self) -> bool {
        self.code == ErrorCode::Io
    }
}
