//! Parsing options and configuration.

/// Share of leading pages sampled when looking for a table of contents.
pub const DEFAULT_CATALOGUE_RATE: f32 = 0.1;

/// Options for a parser session.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether `pages()` assembles pages in parallel
    pub parallel: bool,

    /// Fraction of pages sampled by the catalogue locator
    pub catalogue_rate: f32,

    /// Password for encrypted documents.
    ///
    /// Reserved: lopdf 0.34 cannot decrypt, so opening an encrypted
    /// document with a password only logs a warning and the document is
    /// read as is. Unencrypted documents ignore it.
    pub password: Option<String>,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (failed pages become empty pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the catalogue sampling rate, clamped to `0.0..=1.0`.
    pub fn with_catalogue_rate(mut self, rate: f32) -> Self {
        self.catalogue_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    /// Set password for encrypted documents (reserved, see [`ParseOptions::password`]).
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: false,
            catalogue_rate: DEFAULT_CATALOGUE_RATE,
            password: None,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Replace a failed page with an empty one and continue
    Lenient,
}
