//! Error taxonomy for route decoding and link generation.

use thiserror::Error;

pub use crate::config::loader::ConfigError;

/// The requested controller or action cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No controller is registered under this name.
    #[error("controller `{controller}` not found")]
    NotFound { controller: String },

    /// The target exists but may not be dispatched (abstract or non-public).
    #[error("`{target}` is not accessible")]
    Forbidden { target: String },

    /// The action does not exist and the controller has no fallback handler.
    #[error("cannot resolve `{controller}:{action}`")]
    Unresolvable { controller: String, action: String },
}

/// A parameter or grammar problem; encoding never emits a link past one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Controller or action is not a plain identifier.
    #[error("invalid route identifier `{0}`")]
    InvalidIdentifier(String),

    /// A value contains a separator that cannot be escaped.
    #[error("value `{value}` contains the separator `{separator}`")]
    UnsafeSeparator { value: String, separator: String },

    /// A later annotated parameter was given while this one was missing.
    #[error("missing parameter `{name}`")]
    MissingParam { name: String },

    /// Parameters were given without a controller and no default route exists.
    #[error("parameters need a controller when no default route is configured")]
    MissingController,

    /// The URL does not follow the configured grammar.
    #[error("malformed url: {0}")]
    Malformed(String),
}

/// The parameter token was tampered with or was produced under another key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid or tampered parameter token")]
    InvalidToken,
}

/// Top-level error for every router operation.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A dispatched handler failed.
    #[error("handler failed: {0}")]
    Handler(String),
}

impl RouteError {
    /// True when the request carried a token that failed verification.
    pub fn is_tampering(&self) -> bool {
        matches!(self, RouteError::Crypto(_))
    }

    /// True when the route simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RouteError::Resolution(ResolutionError::NotFound { .. })
                | RouteError::Resolution(ResolutionError::Unresolvable { .. })
        )
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::Config(_) => "config",
            RouteError::Resolution(_) => "resolution",
            RouteError::Codec(_) => "codec",
            RouteError::Crypto(_) => "crypto",
            RouteError::Handler(_) => "handler",
        }
    }
}

/// Result type for router operations.
pub type RouteResult<T> = Result<T, RouteError>;
