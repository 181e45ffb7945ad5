//! Domain library for the URL Shortener.
//!
//! This crate is dependency-light (digest and encoding crates only) and holds
//! the domain types, ports (traits), and error definitions. Keep adapters and
//! IO concerns out of this crate.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed length of every short code, in characters.
pub const CODE_LEN: usize = 10;

/// A fixed-length, URL-safe identifier for a stored mapping.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    pub fn new<S: Into<String>>(s: S) -> Result<Self, CoreError> {
        let val = s.into();
        if val.len() != CODE_LEN {
            return Err(CoreError::InvalidCode("wrong length".into()));
        }
        if !val
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidCode("invalid characters".into()));
        }
        Ok(Self(val))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored association between a long URL and its short code.
///
/// Created once and never mutated; the store enforces code uniqueness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    pub code: ShortCode,
    pub long_url: String,
}

impl Mapping {
    pub fn new(code: ShortCode, long_url: String) -> Self {
        Self { code, long_url }
    }
}

/// Repository port for persisting and loading mappings.
///
/// Implementations must enforce code uniqueness: `insert_unique` fails with
/// `CoreError::Conflict` when the code is already present, which is how a
/// racing insert is detected.
pub trait MappingStore: Send + Sync {
    fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>, CoreError>;
    fn insert_unique(&self, mapping: Mapping) -> Result<(), CoreError>;
}

// A shared handle to a store is itself a store.
impl<S: MappingStore> MappingStore for std::sync::Arc<S> {
    fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>, CoreError> {
        (**self).find_by_code(code)
    }

    fn insert_unique(&self, mapping: Mapping) -> Result<(), CoreError> {
        (**self).insert_unique(mapping)
    }
}

/// Core domain errors (no external error crates to keep deps light).
#[derive(Debug)]
pub enum CoreError {
    InvalidUrl(String),
    InvalidCode(String),
    NotFound,
    /// The store rejected an insert because the code already exists.
    Conflict,
    /// The derived code is taken by a different long URL (digest collision).
    CodeCollision,
    Store(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidUrl(msg) => write!(f, "invalid url: {}", msg),
            CoreError::InvalidCode(msg) => write!(f, "invalid short code: {}", msg),
            CoreError::NotFound => write!(f, "not found"),
            CoreError::Conflict => write!(f, "code already exists"),
            CoreError::CodeCollision => write!(f, "code taken by a different url"),
            CoreError::Store(msg) => write!(f, "store error: {}", msg),
        }
    }
}

impl Error for CoreError {}

/// Return a short about/version line for the binary to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} — domain library loaded", pkg, ver)
}

pub mod adapters;
pub mod derive;
pub mod service;
pub mod validate;
