//! Session lifecycle state machine.
//!
//! `Uninitialized → Initialized → Serving → ShuttingDown → Terminated`.
//! The state decides which incoming messages are legal; the server loop
//! owns the single [`Session`] and consults it before dispatching.
use crate::error::{codes, LspError};

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for `initialize`.
    Uninitialized,
    /// `initialize` answered, waiting for `initialized`.
    Initialized,
    /// Handling document mutations and queries.
    Serving,
    /// `shutdown` received: reads are answered, mutations are rejected.
    ShuttingDown,
    /// `exit` received.
    Terminated,
}

/// Message categories the state machine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// `textDocument/didOpen`, `didChange`, `didSave`, `didClose`.
    Mutation,
    /// `hover`, `completion`, `documentSymbol`.
    Query,
}

/// The lifecycle of one client connection.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh, uninitialized session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, to: SessionState) {
        tracing::info!("session {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Handle `initialize`. Legal exactly once.
    pub fn initialize(&mut self) -> Result<(), LspError> {
        match self.state {
            SessionState::Uninitialized => {
                self.transition(SessionState::Initialized);
                Ok(())
            }
            _ => Err(LspError::rpc(
                codes::INVALID_REQUEST,
                "initialize may only be sent once",
            )),
        }
    }

    /// Handle the `initialized` notification. Returns `false` when it
    /// arrives out of order; the notification is then ignored.
    pub fn initialized(&mut self) -> bool {
        if self.state == SessionState::Initialized {
            self.transition(SessionState::Serving);
            true
        } else {
            tracing::warn!(state = ?self.state, "unexpected initialized notification");
            false
        }
    }

    /// Handle `shutdown`. Always succeeds; repeated calls are no-ops.
    pub fn shutdown(&mut self) {
        match self.state {
            SessionState::ShuttingDown | SessionState::Terminated => {
                tracing::debug!("repeated shutdown");
            }
            _ => self.transition(SessionState::ShuttingDown),
        }
    }

    /// Handle `exit`. Returns the process exit code: 0 after a shutdown,
    /// 1 otherwise.
    pub fn exit(&mut self) -> i32 {
        let code = if self.state == SessionState::ShuttingDown {
            0
        } else {
            1
        };
        self.transition(SessionState::Terminated);
        code
    }

    /// Whether a request of `class` may be served now. The error is sent
    /// back as the response.
    pub fn check_request(&self, class: MessageClass) -> Result<(), LspError> {
        match (self.state, class) {
            (SessionState::Uninitialized, _) => Err(LspError::rpc(
                codes::SERVER_NOT_INITIALIZED,
                "server not initialized",
            )),
            (SessionState::Initialized | SessionState::Serving, _) => Ok(()),
            (SessionState::ShuttingDown, MessageClass::Query) => Ok(()),
            (SessionState::ShuttingDown, MessageClass::Mutation) | (SessionState::Terminated, _) => {
                Err(LspError::rpc(codes::INVALID_REQUEST, "server is shutting down"))
            }
        }
    }

    /// Whether a document mutation notification should be applied now.
    pub fn accepts_mutation(&self) -> bool {
        self.check_request(MessageClass::Mutation).is_ok()
    }
}
