use std::fmt;

/// The interpreter's single error type, covering all three failure kinds a
/// `Run` call can abort with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpError {
    /// Malformed token stream or malformed special-form shape.
    Syntax(String),
    /// Reference to an unbound symbol, or `set!` of an unknown name.
    Name(String),
    /// Type mismatch, arity mismatch, division by zero, and similar.
    Runtime(String),
}

impl InterpError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }

    pub fn name(message: impl Into<String>) -> Self {
        Self::Name(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

impl fmt::Display for InterpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(message) => write!(f, "syntax error: {message}"),
            Self::Name(message) => write!(f, "name error: {message}"),
            Self::Runtime(message) => write!(f, "runtime error: {message}"),
        }
    }
}

impl std::error::Error for InterpError {}
