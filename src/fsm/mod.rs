//! Function-pointer finite state machine for the Wi-Fi link.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ LinkState    │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Configuring  │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Configured   │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Invalid      │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Connected    │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Running      │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Disconnected │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  └──────────────┴───────────┴──────────┴───────────────────┘   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer. Handlers only see `&mut LinkContext`; every side
//! effect is queued as a [`LinkRequest`](context::LinkRequest) and applied
//! by the service after the tick.

pub mod context;
pub mod states;

use context::LinkContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Connection lifecycle states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LinkState {
    Configuring = 0,
    Configured = 1,
    Invalid = 2,
    Connected = 3,
    Running = 4,
    Disconnected = 5,
}

impl LinkState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert an index back to `LinkState`. Out-of-range indices assert in
    /// debug builds and fall back to `Configuring` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Configuring,
            1 => Self::Configured,
            2 => Self::Invalid,
            3 => Self::Connected,
            4 => Self::Running,
            5 => Self::Disconnected,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Configuring
            }
        }
    }

    /// States the link leaves only through a retry.
    pub fn is_recovering(self) -> bool {
        matches!(self, Self::Invalid | Self::Disconnected)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut LinkContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut LinkContext) -> Option<LinkState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: LinkState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `LinkState as usize`.
    table: [StateDescriptor; LinkState::COUNT],
    current: usize,
    /// Monotonic ms at which the current state was entered.
    state_entry_ms: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; LinkState::COUNT], initial: LinkState) -> Self {
        Self {
            table,
            current: initial as usize,
            state_entry_ms: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut LinkContext) {
        info!("Link FSM starting in state: {}", self.table[self.current].name);
        self.state_entry_ms = ctx.now_ms;
        ctx.ms_in_state = 0;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM using `ctx.now_ms`.
    ///
    /// Returns the new state when a transition happened.
    pub fn tick(&mut self, ctx: &mut LinkContext) -> Option<LinkState> {
        ctx.ms_in_state = ctx.now_ms.saturating_sub(self.state_entry_ms);

        let next = (self.table[self.current].on_update)(ctx)?;
        if next as usize == self.current {
            return None;
        }
        self.transition(next, ctx);
        Some(next)
    }

    /// Force an immediate transition (credential reset, re-provisioning).
    pub fn force_transition(&mut self, next: LinkState, ctx: &mut LinkContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> LinkState {
        LinkState::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: LinkState, ctx: &mut LinkContext) {
        let next_idx = next as usize;

        info!(
            "Link FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_ms = ctx.now_ms;
        ctx.ms_in_state = 0;
        ctx.failed = None;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
