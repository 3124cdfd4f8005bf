//! What the workflows ask the rendering layer to do: which page to show, when,
//! and which notice to display.
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Pause between a success notice and the redirect, so the notice is seen.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Notices disappear on their own after this long.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Page {
    #[serde(rename = "auth.html")]
    Auth,
    #[serde(rename = "dashboard.html")]
    Dashboard,
    #[serde(rename = "index.html")]
    Landing,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Auth => "auth.html",
            Page::Dashboard => "dashboard.html",
            Page::Landing => "index.html",
        }
    }

    /// Maps a location path to a page; unknown paths are `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_start_matches('/') {
            "auth.html" => Some(Page::Auth),
            "dashboard.html" => Some(Page::Dashboard),
            "" | "index.html" => Some(Page::Landing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: Page,
    #[serde(rename = "after_ms", serialize_with = "as_millis")]
    pub after: Duration,
}

impl Redirect {
    pub fn now(to: Page) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub fn delayed(to: Page) -> Self {
        Self {
            to,
            after: REDIRECT_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(rename = "ttl_ms", serialize_with = "as_millis")]
    pub ttl: Duration,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            ttl: NOTICE_TTL,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, message)
    }
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
