//! Shared mutable context threaded through every link-state handler.
//!
//! `LinkContext` is the blackboard the handlers read from and write to:
//! the latest observations of the Wi-Fi driver and the datagram service,
//! timing, retry backoff, and the queue of [`LinkRequest`]s the service
//! applies to the ports after each tick. Handlers never touch a port
//! directly.

use heapless::Vec;

use crate::app::ports::LinkStatus;
use crate::config::ControllerConfig;
use crate::error::LinkError;

// ---------------------------------------------------------------------------
// Observations (read-only to handlers; written by the service)
// ---------------------------------------------------------------------------

/// A point-in-time view of the link, sampled before each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkObservations {
    /// The driver holds a valid SSID/password pair.
    pub credentials_valid: bool,
    pub status: LinkStatus,
    /// The datagram service is bound and listening.
    pub service_open: bool,
}

impl Default for LinkObservations {
    fn default() -> Self {
        Self {
            credentials_valid: false,
            status: LinkStatus::Down,
            service_open: false,
        }
    }
}

impl LinkObservations {
    /// Associated with an address assigned.
    pub fn ip_ready(&self) -> bool {
        matches!(self.status, LinkStatus::Associated { ip_ready: true })
    }
}

// ---------------------------------------------------------------------------
// Requests (written by handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Side effects a handler asks the service to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRequest {
    /// Install credentials from the store (or the configured fallback).
    LoadCredentials,
    /// Start associating with the configured network.
    Associate,
    /// Bind the datagram service.
    OpenService,
    /// Unbind the datagram service.
    CloseService,
    /// Drop the association.
    Teardown,
}

/// Upper bound on requests queued by a single transition.
pub const MAX_REQUESTS: usize = 4;

// ---------------------------------------------------------------------------
// Retry backoff
// ---------------------------------------------------------------------------

/// Exponential retry delay: `min`, `2·min`, … capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    min_ms: u32,
    max_ms: u32,
    current_ms: u32,
}

impl Backoff {
    pub fn new(min_ms: u32, max_ms: u32) -> Self {
        Self {
            min_ms,
            max_ms,
            current_ms: min_ms,
        }
    }

    /// Delay for the next retry; doubles the one after.
    pub fn next_delay(&mut self) -> u32 {
        let delay = self.current_ms;
        self.current_ms = self.current_ms.saturating_mul(2).min(self.max_ms);
        delay
    }

    pub fn reset(&mut self) {
        self.current_ms = self.min_ms;
    }
}

// ---------------------------------------------------------------------------
// LinkContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct LinkContext {
    // -- Timing --
    /// Monotonic milliseconds, set by the caller before each tick.
    pub now_ms: u64,
    /// Milliseconds since the current state was entered.
    pub ms_in_state: u64,

    // -- Inputs --
    pub obs: LinkObservations,
    /// Operator asked for an immediate retry (button short press).
    pub retry_requested: bool,
    /// The last request the service could not carry out, since entering the
    /// current state.
    pub failed: Option<(LinkRequest, LinkError)>,

    // -- Outputs --
    pub requests: Vec<LinkRequest, MAX_REQUESTS>,

    // -- Recovery --
    pub backoff: Backoff,
    /// When `Invalid` / `Disconnected` retry on their own.
    pub retry_at_ms: u64,
    pub association_timeout_ms: u32,
    /// Reason for the most recent drop out of the happy path.
    pub last_error: Option<LinkError>,
    /// `OpenService` has been queued in the current `Connected` visit.
    pub service_requested: bool,
}

impl LinkContext {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            now_ms: 0,
            ms_in_state: 0,
            obs: LinkObservations::default(),
            retry_requested: false,
            failed: None,
            requests: Vec::new(),
            backoff: Backoff::new(config.retry_min_ms, config.retry_max_ms),
            retry_at_ms: 0,
            association_timeout_ms: config.association_timeout_ms,
            last_error: None,
            service_requested: false,
        }
    }

    /// Queue a side effect for the service.
    pub fn request(&mut self, req: LinkRequest) {
        if self.requests.contains(&req) {
            return;
        }
        if self.requests.push(req).is_err() {
            log::error!("Link: request queue full, dropping {:?}", req);
        }
    }

    /// Drain queued requests in order.
    pub fn take_requests(&mut self) -> Vec<LinkRequest, MAX_REQUESTS> {
        core::mem::take(&mut self.requests)
    }

    /// Arm the automatic retry timer from the backoff.
    pub fn schedule_retry(&mut self) -> u32 {
        let delay = self.backoff.next_delay();
        self.retry_at_ms = self.now_ms + u64::from(delay);
        delay
    }

    pub fn retry_due(&self) -> bool {
        self.now_ms >= self.retry_at_ms
    }
}
