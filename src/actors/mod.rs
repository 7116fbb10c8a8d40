//! Actor system for background tasks.
//!
//! Each actor is an independent tokio task that communicates with the front
//! end via message passing. The only actor today owns the [`Shell`]: the
//! shell runs on a single task so command handlers never overlap.
//!
//! NOTE: Keyboard input is handled synchronously in the logic thread,
//! not via an actor, for minimum latency.
//!
//! [`Shell`]: crate::shell::Shell

pub mod shell;

use tokio_util::sync::CancellationToken;

pub use shell::{ShellActor, ShellHandle, ShellInput};

/// Handle to a running actor, used for graceful shutdown.
pub struct ActorHandle {
    cancel: CancellationToken,
}

impl ActorHandle {
    /// Create a new actor handle with a cancellation token.
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Signal the actor to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Check if shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
