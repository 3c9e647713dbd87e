use std::fmt;

#[derive(Debug)]
pub enum LookupError {
    /// Registry CSV is unreadable or missing required columns.
    Registry(String),
    /// Transport-level failure (connect, timeout).
    Transport(String),
    /// Authentication rejected by the remote registry.
    Auth { status: u16, message: String },
    /// Upstream returned an error status after retries were exhausted.
    Upstream { status: u16, message: String },
    /// Rate limited after retries were exhausted.
    RateLimited { attempts: u32 },
    /// Response body did not parse as expected.
    Parse(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(msg) => write!(f, "registry error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Auth { status, message } => {
                write!(f, "registry auth failed ({status}): {message}")
            }
            Self::Upstream { status, message } => {
                write!(f, "registry upstream error ({status}): {message}")
            }
            Self::RateLimited { attempts } => {
                write!(f, "registry rate limited after {attempts} attempts")
            }
            Self::Parse(msg) => write!(f, "registry response parse error: {msg}"),
        }
    }
}

impl std::error::Error for LookupError {}
