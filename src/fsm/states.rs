//! Concrete link-state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  CONFIGURING ──[credentials valid]──▶ CONFIGURED ──[association begins]──▶ CONNECTED
//!       ▲                                    │                                 │    │
//!       │                              [refused]          [fails | timeout]    │    │ [IP + service up]
//!       │                                    ▼                                 │    ▼
//!       ├──────[retry | timer]──────────  INVALID ◀─────────────────────────────┘  RUNNING
//!       │                                                                            │
//!       └──────[retry | timer]──────────  DISCONNECTED ◀────────[link lost]──────────┘
//! ```

use super::context::{LinkContext, LinkRequest};
use super::{LinkState, StateDescriptor};
use crate::app::ports::LinkStatus;
use crate::error::LinkError;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; LinkState::COUNT] {
    [
        // Index 0: Configuring
        StateDescriptor {
            id: LinkState::Configuring,
            name: "Configuring",
            on_enter: Some(configuring_enter),
            on_exit: None,
            on_update: configuring_update,
        },
        // Index 1: Configured
        StateDescriptor {
            id: LinkState::Configured,
            name: "Configured",
            on_enter: Some(configured_enter),
            on_exit: None,
            on_update: configured_update,
        },
        // Index 2: Invalid
        StateDescriptor {
            id: LinkState::Invalid,
            name: "Invalid",
            on_enter: Some(recovery_enter),
            on_exit: None,
            on_update: recovery_update,
        },
        // Index 3: Connected
        StateDescriptor {
            id: LinkState::Connected,
            name: "Connected",
            on_enter: Some(connected_enter),
            on_exit: None,
            on_update: connected_update,
        },
        // Index 4: Running
        StateDescriptor {
            id: LinkState::Running,
            name: "Running",
            on_enter: Some(running_enter),
            on_exit: Some(running_exit),
            on_update: running_update,
        },
        // Index 5: Disconnected
        StateDescriptor {
            id: LinkState::Disconnected,
            name: "Disconnected",
            on_enter: Some(recovery_enter),
            on_exit: None,
            on_update: recovery_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONFIGURING: waiting for usable credentials
// ═══════════════════════════════════════════════════════════════════════════

fn configuring_enter(ctx: &mut LinkContext) {
    ctx.request(LinkRequest::LoadCredentials);
    info!("CONFIGURING: loading Wi-Fi credentials");
}

fn configuring_update(ctx: &mut LinkContext) -> Option<LinkState> {
    if ctx.obs.credentials_valid {
        return Some(LinkState::Configured);
    }
    // Newly provisioned credentials may be in the store now.
    if core::mem::take(&mut ctx.retry_requested) {
        ctx.request(LinkRequest::LoadCredentials);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONFIGURED: credentials installed, association about to start
// ═══════════════════════════════════════════════════════════════════════════

fn configured_enter(ctx: &mut LinkContext) {
    ctx.request(LinkRequest::Associate);
    info!("CONFIGURED: starting association");
}

fn configured_update(ctx: &mut LinkContext) -> Option<LinkState> {
    if let Some((LinkRequest::Associate, err)) = ctx.failed {
        ctx.last_error = Some(err);
        return Some(LinkState::Invalid);
    }
    match ctx.obs.status {
        LinkStatus::Associating | LinkStatus::Associated { .. } => Some(LinkState::Connected),
        LinkStatus::Failed => {
            ctx.last_error = Some(LinkError::AssociationFailed);
            Some(LinkState::Invalid)
        }
        LinkStatus::Down => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTED: associating, waiting for IP and the datagram service
// ═══════════════════════════════════════════════════════════════════════════

fn connected_enter(ctx: &mut LinkContext) {
    ctx.service_requested = false;
    info!(
        "CONNECTED: waiting for IP (timeout {} ms)",
        ctx.association_timeout_ms
    );
}

fn connected_update(ctx: &mut LinkContext) -> Option<LinkState> {
    if let Some((_, err)) = ctx.failed {
        ctx.last_error = Some(err);
        return Some(LinkState::Invalid);
    }
    if ctx.obs.status == LinkStatus::Failed {
        ctx.last_error = Some(LinkError::AssociationFailed);
        return Some(LinkState::Invalid);
    }

    if ctx.obs.ip_ready() {
        if ctx.obs.service_open {
            return Some(LinkState::Running);
        }
        if !ctx.service_requested {
            ctx.service_requested = true;
            ctx.request(LinkRequest::OpenService);
        }
    }

    if ctx.ms_in_state >= u64::from(ctx.association_timeout_ms) {
        warn!("CONNECTED: no usable link after {} ms", ctx.ms_in_state);
        ctx.last_error = Some(LinkError::AssociationTimeout);
        return Some(LinkState::Invalid);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING: serving commands
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut LinkContext) {
    ctx.backoff.reset();
    ctx.last_error = None;
    info!("RUNNING: accepting commands");
}

fn running_exit(ctx: &mut LinkContext) {
    ctx.request(LinkRequest::CloseService);
    info!("RUNNING: command service closed");
}

fn running_update(ctx: &mut LinkContext) -> Option<LinkState> {
    if !ctx.obs.ip_ready() {
        ctx.last_error = Some(LinkError::LinkLost);
        return Some(LinkState::Disconnected);
    }
    if !ctx.obs.service_open {
        ctx.last_error = Some(LinkError::ServiceUnavailable);
        return Some(LinkState::Disconnected);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  INVALID / DISCONNECTED: recoverable, retry after backoff or on request
// ═══════════════════════════════════════════════════════════════════════════

fn recovery_enter(ctx: &mut LinkContext) {
    ctx.request(LinkRequest::Teardown);
    let delay = ctx.schedule_retry();
    match ctx.last_error {
        Some(err) => warn!("LINK DOWN: {}, retrying in {} ms", err, delay),
        None => warn!("LINK DOWN: retrying in {} ms", delay),
    }
}

fn recovery_update(ctx: &mut LinkContext) -> Option<LinkState> {
    if core::mem::take(&mut ctx.retry_requested) {
        info!("LINK DOWN: retry requested");
        return Some(LinkState::Configuring);
    }
    if ctx.retry_due() {
        return Some(LinkState::Configuring);
    }
    None
}
