//! Mock implementations for testing the verification service

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::domain::value_objects::{AuthToken, DeviceMetadata, FinalizeOutcome, InitiateOutcome};
use crate::errors::{VerificationError, VerificationResult};
use crate::services::verification::traits::{
    DeviceInfoTrait, TokenProviderTrait, VerificationTransportTrait,
};
use crate::services::verification::SessionEvent;

pub const CUSTOMER_ID: &str = "11111111-2222-3333-4444-555555555555";

pub fn outcome(request_id: &str, timeout_seconds: u32) -> InitiateOutcome {
    InitiateOutcome {
        request_id: request_id.to_string(),
        timeout_seconds,
        max_retries: 3,
        status_code: 290,
        status_message: "Message in progress".to_string(),
    }
}

pub fn verified() -> FinalizeOutcome {
    FinalizeOutcome {
        status_code: 200,
        status_message: "Verified".to_string(),
    }
}

pub fn app_error(code: i64, message: &str) -> VerificationError {
    VerificationError::ApplicationError {
        code,
        message: message.to_string(),
    }
}

// Mock token provider for testing
#[derive(Default)]
pub struct MockTokenProvider {
    pub calls: AtomicUsize,
    pub failure: Mutex<Option<VerificationError>>,
}

impl MockTokenProvider {
    pub fn failing(error: VerificationError) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failure: Mutex::new(Some(error)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProviderTrait for MockTokenProvider {
    async fn obtain_token(&self, _customer_id: &str) -> VerificationResult<AuthToken> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(AuthToken::new(format!("token-{call}")))
    }
}

// Mock transport with scripted responses. Unscripted initiates succeed with
// request ids `req-1`, `req-2`, ... and unscripted finalizes succeed.
pub struct MockTransport {
    pub default_timeout: u32,
    pub initiate_results: Mutex<VecDeque<VerificationResult<InitiateOutcome>>>,
    pub finalize_results: Mutex<VecDeque<VerificationResult<FinalizeOutcome>>>,
    pub initiate_calls: Mutex<Vec<(String, Option<DeviceMetadata>)>>,
    pub finalize_calls: Mutex<Vec<(String, String)>>,
    pub delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new(default_timeout: u32) -> Self {
        Self {
            default_timeout,
            initiate_results: Mutex::new(VecDeque::new()),
            finalize_results: Mutex::new(VecDeque::new()),
            initiate_calls: Mutex::new(Vec::new()),
            finalize_calls: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }

    pub fn push_initiate(&self, result: VerificationResult<InitiateOutcome>) {
        self.initiate_results.lock().unwrap().push_back(result);
    }

    pub fn push_finalize(&self, result: VerificationResult<FinalizeOutcome>) {
        self.finalize_results.lock().unwrap().push_back(result);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn initiate_count(&self) -> usize {
        self.initiate_calls.lock().unwrap().len()
    }

    pub fn finalize_count(&self) -> usize {
        self.finalize_calls.lock().unwrap().len()
    }

    async fn wait(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl VerificationTransportTrait for MockTransport {
    async fn initiate(
        &self,
        _token: &AuthToken,
        phone_number: &str,
        metadata: Option<&DeviceMetadata>,
    ) -> VerificationResult<InitiateOutcome> {
        let call = {
            let mut calls = self.initiate_calls.lock().unwrap();
            calls.push((phone_number.to_string(), metadata.cloned()));
            calls.len()
        };
        self.wait().await;

        let scripted = self.initiate_results.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(outcome(&format!("req-{call}"), self.default_timeout)))
    }

    async fn finalize(&self, request_id: &str, code: &str) -> VerificationResult<FinalizeOutcome> {
        self.finalize_calls
            .lock()
            .unwrap()
            .push((request_id.to_string(), code.to_string()));
        self.wait().await;

        let scripted = self.finalize_results.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(verified()))
    }
}

pub struct FixedDeviceInfo;

impl DeviceInfoTrait for FixedDeviceInfo {
    fn collect(&self) -> DeviceMetadata {
        DeviceMetadata {
            app_name: Some("AppVerifyTest".to_string()),
            os_name: Some("testos".to_string()),
            ..DeviceMetadata::default()
        }
    }
}

/// Receive events until one matches, returning everything seen on the way
pub async fn wait_for(
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    predicate: impl Fn(&SessionEvent) -> bool,
) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    loop {
        let event = timeout(Duration::from_secs(600), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed");
        let matched = predicate(&event);
        seen.push(event);
        if matched {
            return seen;
        }
    }
}

/// Drain events that are already queued
pub fn drain(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}
