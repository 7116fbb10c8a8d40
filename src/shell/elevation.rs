//! Challenge/response elevation for privileged commands.
//!
//! There is no elevated session: each privileged invocation verifies a
//! secret, receives its own [`ElevationContext`] by value, and the context
//! is dropped when that handler returns.

use std::fmt;

use crate::api::Api;
use crate::{flog_debug, flog_warn};

/// Proof that a secret was accepted by the remote verifier.
///
/// Neither `Clone` nor `Default`: the only way to obtain one is
/// [`verify`], and it moves into exactly one handler invocation.
pub struct ElevationContext {
    bearer: String,
}

impl ElevationContext {
    pub(crate) fn new(bearer: String) -> Self {
        Self { bearer }
    }

    pub fn bearer(&self) -> &str {
        &self.bearer
    }
}

impl fmt::Debug for ElevationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevationContext")
            .field("bearer", &"<redacted>")
            .finish()
    }
}

/// Send `secret` to the verifier. Transport failures count as rejection.
pub async fn verify(api: &dyn Api, secret: String) -> Option<ElevationContext> {
    flog_debug!("Verifying elevation secret (len={})", secret.len());
    match api.verify_secret(&secret).await {
        Ok(()) => Some(ElevationContext::new(secret)),
        Err(e) => {
            flog_warn!("Elevation rejected: {}", e);
            None
        }
    }
}
