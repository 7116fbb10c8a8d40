//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side effects
//! to be executed by the runtime.

/// Output commands from the update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hand a typed line to the shell.
    Submit { line: String },

    /// Ctrl+C: cancel whatever the shell is waiting on.
    Interrupt,

    // App lifecycle
    Quit,
}
