//! Interactive stdin channel: lets a running handler ask for one more line.
//!
//! At most one read is outstanding. The dispatcher routes the next typed line
//! to whoever is waiting, so handlers never see input meant for the shell.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::{flog_debug, Error, Result};

struct PendingRead {
    prompt: String,
    tx: oneshot::Sender<String>,
}

#[derive(Clone, Default)]
pub struct Stdin {
    slot: Arc<Mutex<Option<PendingRead>>>,
}

impl Stdin {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<PendingRead>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Suspend until the user types a line. `prompt` labels the input field.
    ///
    /// Fails with [`Error::StdinBusy`] if a read is already pending, and with
    /// [`Error::Interrupted`] if the read is abandoned.
    pub async fn request_line(&self, prompt: impl Into<String>) -> Result<String> {
        let rx = {
            let mut slot = self.lock();
            if slot.as_ref().is_some_and(|p| !p.tx.is_closed()) {
                return Err(Error::StdinBusy);
            }
            let (tx, rx) = oneshot::channel();
            let prompt = prompt.into();
            flog_debug!("stdin: requesting line prompt={:?}", prompt);
            *slot = Some(PendingRead { prompt, tx });
            rx
        };
        rx.await.map_err(|_| Error::Interrupted)
    }

    /// True while a handler is suspended in [`Stdin::request_line`].
    pub fn is_waiting(&self) -> bool {
        self.lock().as_ref().is_some_and(|p| !p.tx.is_closed())
    }

    pub fn pending_prompt(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .filter(|p| !p.tx.is_closed())
            .map(|p| p.prompt.clone())
    }

    /// Hand `line` to the waiting reader. Returns false if nobody was waiting.
    pub(crate) fn deliver(&self, line: String) -> bool {
        match self.lock().take() {
            Some(pending) => pending.tx.send(line).is_ok(),
            None => false,
        }
    }

    /// Drop the pending read, if any. Its reader resolves to `Interrupted`.
    pub(crate) fn abandon(&self) -> bool {
        self.lock().take().is_some()
    }
}
