//! Resolves verification deep links into code submissions

use std::sync::RwLock;

use av_shared::DeepLinkConfig;

use crate::domain::value_objects::DeepLinkRequest;
use crate::errors::{VerificationError, VerificationResult};
use crate::services::verification::SessionHandle;

/// Routes codes carried by `<any scheme>://<host>?<code>` links to the
/// registered session.
///
/// Links for other hosts are ignored. The resolver never looks at
/// presentation state; it only talks to the session through its handle.
pub struct DeepLinkResolver {
    config: DeepLinkConfig,
    session: RwLock<Option<SessionHandle>>,
}

impl DeepLinkResolver {
    pub fn new(config: DeepLinkConfig) -> Self {
        Self {
            config,
            session: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &DeepLinkConfig {
        &self.config
    }

    /// Route future links to `handle`
    pub fn register(&self, handle: SessionHandle) {
        if let Ok(mut session) = self.session.write() {
            *session = Some(handle);
        }
    }

    pub fn unregister(&self) {
        if let Ok(mut session) = self.session.write() {
            *session = None;
        }
    }

    pub fn is_registered(&self) -> bool {
        self.session
            .read()
            .map(|session| session.is_some())
            .unwrap_or(false)
    }

    /// Resolve an incoming link.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Not a verification link; ignored
    /// * `Ok(Some(code))` - The code was submitted to the active session
    /// * `Err(VerificationError::DeepLinkUnhandled)` - A verification link that
    ///   carries no code, or arrived while no session accepts one
    /// * `Err(other)` - The session rejected the code for another reason
    pub async fn resolve(&self, url: &str) -> VerificationResult<Option<String>> {
        let Some(request) = DeepLinkRequest::parse(url) else {
            tracing::debug!(event = "deep_link_ignored", "Ignoring unparsable link");
            return Ok(None);
        };
        if !request.targets(&self.config.scheme, &self.config.host) {
            tracing::debug!(
                host = %request.host,
                event = "deep_link_ignored",
                "Ignoring link for another host"
            );
            return Ok(None);
        }

        let Some(code) = request.code else {
            tracing::warn!(event = "deep_link_unhandled", "Verification link carries no code");
            return Err(VerificationError::DeepLinkUnhandled);
        };

        // Clone out so the lock is not held across the await
        let handle = self
            .session
            .read()
            .ok()
            .and_then(|session| session.clone());
        let Some(handle) = handle else {
            tracing::warn!(event = "deep_link_unhandled", "No session registered for link");
            return Err(VerificationError::DeepLinkUnhandled);
        };

        if !handle.status().accepts_code() {
            tracing::warn!(
                status = %handle.status(),
                event = "deep_link_unhandled",
                "Link arrived while no code is expected"
            );
            return Err(VerificationError::DeepLinkUnhandled);
        }

        match handle.submit_code(code.clone()).await {
            Ok(()) => {
                tracing::info!(event = "deep_link_resolved", "Code submitted from link");
                Ok(Some(code))
            }
            Err(
                VerificationError::SessionNotActive { .. }
                | VerificationError::SessionExpired
                | VerificationError::ServiceStopped,
            ) => Err(VerificationError::DeepLinkUnhandled),
            Err(error) => Err(error),
        }
    }
}
