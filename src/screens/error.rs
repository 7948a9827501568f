use serde::Serialize;
use std::fmt;

/// A blocking message shown to the user: the outcome of every screen action,
/// success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// A bare title, for confirmations such as `Liked!`.
    pub fn titled(title: impl Into<String>) -> Self {
        Self::new(title, String::new())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new("Success", message)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{}: {}", self.title, self.message)
        }
    }
}

impl std::error::Error for Alert {}
