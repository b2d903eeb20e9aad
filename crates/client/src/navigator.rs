//! Front-end hooks for transient notices and view changes.

use core::fmt;

/// Text of the notice shown when the session expires.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// A top-level view the client can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Anonymous landing page.
    Landing,
    /// Login form.
    Login,
    /// Order history.
    Orders,
}

impl View {
    /// Route path for the view.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Orders => "/orders",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    /// The session-expired notice.
    #[must_use]
    pub fn session_expired() -> Self {
        Self {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
        }
    }
}

/// Implemented by the front end to render notices and switch views.
///
/// Calls come from inside the client, sometimes from a spawned task, and
/// must not block.
pub trait Navigator: Send + Sync {
    /// Show a transient notice.
    fn show_notice(&self, notice: &Notice);

    /// Hide the current notice.
    fn dismiss_notice(&self);

    /// Switch to a view.
    fn navigate(&self, view: View);
}

/// Navigator for headless front ends that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn show_notice(&self, notice: &Notice) {
        tracing::warn!(message = %notice.message, "Notice");
    }

    fn dismiss_notice(&self) {
        tracing::debug!("Notice dismissed");
    }

    fn navigate(&self, view: View) {
        tracing::info!(view = %view, "Navigating");
    }
}
