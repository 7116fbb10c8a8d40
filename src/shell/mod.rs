//! The in-page command shell: registry, dispatcher, elevation and stdin.

pub mod commands;
pub mod dispatcher;
pub mod elevation;
pub mod registry;
pub mod stdin;
pub mod transcript;

pub use commands::builtin_registry;
pub use dispatcher::{InputMode, SessionState, Shell, INTERRUPT_MARKER};
pub use elevation::ElevationContext;
pub use registry::{CommandContext, CommandDescriptor, Handler, HandlerFuture, Registry};
pub use stdin::Stdin;
pub use transcript::{Line, LineKind, Transcript};
