use std::cell::Cell;

use crate::config::SessionConfig;
use crate::errors::*;
use crate::parse_utils::truncate_message;
use crate::services::*;

/// User-visible run log in the registry, open for the duration of one flow.
pub struct AppSession<'a> {
    registry: &'a dyn Registry,
    id: String,
    status: Cell<SessionStatus>,
    max_message_len: usize,
}

impl<'a> AppSession<'a> {
    pub fn open(registry: &'a dyn Registry, name: &str, config: &SessionConfig) -> Result<Self> {
        let id = registry.create_session(name, config.timeout_secs)?;
        tracing::info!(session_id = %id, name, "App session created");

        Ok(Self {
            registry,
            id,
            status: Cell::new(SessionStatus::Succeeded),
            max_message_len: config.max_message_len,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status.get()
    }

    /// Status written when the session is closed without an error.
    pub fn set_status(&self, status: SessionStatus) {
        self.status.set(status);
    }

    pub fn add_message(&self, content: &str, style: MessageStyle) -> Result<()> {
        let content = truncate_message(content, self.max_message_len);
        tracing::debug!(
            session_id = %self.id,
            style = ?style,
            content = %content,
            "Adding session message"
        );
        self.registry.add_session_message(&self.id, &content, style)
    }

    pub fn info(&self, content: &str) -> Result<()> {
        self.add_message(content, MessageStyle::Info)
    }

    /// Write the final status. An error that aborted the run is posted to the session,
    /// which is then marked as failed.
    pub fn close(self, error: Option<&Error>) -> Result<()> {
        let status = if let Some(e) = error {
            self.add_message(&e.to_string(), MessageStyle::Error)?;
            SessionStatus::Failed
        } else {
            self.status()
        };

        tracing::info!(session_id = %self.id, status = ?status, "Closing app session");
        self.registry.update_session_status(&self.id, status)
    }
}
