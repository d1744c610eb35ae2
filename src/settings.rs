//! Persisted operating settings.
//!
//! The settings record is `{ val, str }`: `val` is the actuation delay in
//! milliseconds and `str` the code-mode label (`"GENERIC"` / `"OPTIMIZED"`).
//! An empty label means "no data" and loads as defaults.
//!
//! ## Slot layout
//!
//! ```text
//! settings/slot_a ─┐   postcard{ generation, record } ‖ sha256[..4]
//! settings/slot_b ─┘
//! ```
//!
//! Saves alternate between the two slots, so a torn or failed write only
//! ever touches the slot that does *not* hold the committed value. `load`
//! takes the valid slot with the highest generation.

use heapless::String;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::StoragePort;
use crate::error::StoreError;
use crate::protocol::command::SettingsChange;

const NAMESPACE: &str = "settings";
const SLOT_KEYS: [&str; 2] = ["slot_a", "slot_b"];
const CHECKSUM_LEN: usize = 4;
const MAX_SLOT_LEN: usize = 64;
const LABEL_CAP: usize = 35;

const GENERIC_LABEL: &str = "GENERIC";
const OPTIMIZED_LABEL: &str = "OPTIMIZED";

pub const DEFAULT_ACTUATION_DELAY_MS: u32 = 1000;

/// Reply encoding selected by `CHANGE_CODE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeMode {
    /// Replies echo the request after the reply code.
    Generic,
    /// Replies carry the bare reply code.
    #[default]
    Optimized,
}

impl CodeMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Generic => GENERIC_LABEL,
            Self::Optimized => OPTIMIZED_LABEL,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            GENERIC_LABEL => Some(Self::Generic),
            OPTIMIZED_LABEL => Some(Self::Optimized),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub actuation_delay_ms: u32,
    pub code_mode: CodeMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            actuation_delay_ms: DEFAULT_ACTUATION_DELAY_MS,
            code_mode: CodeMode::Optimized,
        }
    }
}

impl Settings {
    /// Copy of `self` with `change` applied.
    pub fn with_change(self, change: SettingsChange) -> Self {
        match change {
            SettingsChange::SetDelay(ms) => Self {
                actuation_delay_ms: ms,
                ..self
            },
            SettingsChange::SetCode(mode) => Self {
                code_mode: mode,
                ..self
            },
        }
    }
}

// ── Persisted form ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SettingsRecord {
    val: u32,
    str: String<LABEL_CAP>,
}

impl SettingsRecord {
    fn from_settings(s: Settings) -> Self {
        let mut str = String::new();
        // Both labels fit the capacity.
        let _ = str.push_str(s.code_mode.label());
        Self {
            val: s.actuation_delay_ms,
            str,
        }
    }

    /// `None` for the empty sentinel or an unknown label.
    fn to_settings(&self) -> Option<Settings> {
        if self.str.is_empty() {
            return None;
        }
        Some(Settings {
            actuation_delay_ms: self.val,
            code_mode: CodeMode::from_label(&self.str)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SlotEnvelope {
    generation: u32,
    record: SettingsRecord,
}

fn checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = hmac_sha256::Hash::hash(bytes);
    [digest[0], digest[1], digest[2], digest[3]]
}

fn encode_slot(envelope: &SlotEnvelope) -> Result<([u8; MAX_SLOT_LEN], usize), StoreError> {
    let mut buf = [0u8; MAX_SLOT_LEN];
    let used = postcard::to_slice(envelope, &mut buf)
        .map_err(|_| StoreError::Io)?
        .len();
    let sum = checksum(&buf[..used]);
    buf.get_mut(used..used + CHECKSUM_LEN)
        .ok_or(StoreError::Full)?
        .copy_from_slice(&sum);
    Ok((buf, used + CHECKSUM_LEN))
}

fn decode_slot(bytes: &[u8]) -> Result<SlotEnvelope, StoreError> {
    if bytes.len() <= CHECKSUM_LEN {
        return Err(StoreError::Corrupted);
    }
    let (body, sum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if checksum(body) != sum {
        return Err(StoreError::Corrupted);
    }
    postcard::from_bytes(body).map_err(|_| StoreError::Corrupted)
}

/// Serial-number comparison: `a` is newer than `b` across a counter wrap.
fn newer(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) > 0
}

fn read_slot(storage: &impl StoragePort, key: &str) -> Result<SlotEnvelope, StoreError> {
    let mut buf = [0u8; MAX_SLOT_LEN];
    let len = storage.read(NAMESPACE, key, &mut buf)?;
    decode_slot(&buf[..len])
}

// ── Store ─────────────────────────────────────────────────────

/// Owner of the live [`Settings`] and of the slot bookkeeping.
///
/// The byte store itself is passed in per call, like every other port.
#[derive(Debug, Default)]
pub struct SettingsStore {
    current: Settings,
    generation: u32,
    /// Index into [`SLOT_KEYS`] that the next save writes.
    next_slot: usize,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Settings {
        self.current
    }

    /// Load the newest valid record, falling back to defaults.
    pub fn load(&mut self, storage: &impl StoragePort) -> Settings {
        let mut newest: Option<(usize, SlotEnvelope)> = None;
        for (slot, key) in SLOT_KEYS.iter().enumerate() {
            match read_slot(storage, key) {
                Ok(env) => {
                    if newest
                        .as_ref()
                        .is_none_or(|(_, best)| newer(env.generation, best.generation))
                    {
                        newest = Some((slot, env));
                    }
                }
                Err(StoreError::NotFound) => {}
                Err(e) => warn!("Settings: {} unreadable ({}), ignoring", key, e),
            }
        }

        match newest {
            Some((slot, env)) => {
                self.generation = env.generation;
                self.next_slot = 1 - slot;
                self.current = env.record.to_settings().unwrap_or_else(|| {
                    info!("Settings: stored record empty, using defaults");
                    Settings::default()
                });
                info!(
                    "Settings: loaded gen {} from {} ({} ms, {})",
                    env.generation,
                    SLOT_KEYS[slot],
                    self.current.actuation_delay_ms,
                    self.current.code_mode.label()
                );
            }
            None => {
                info!("Settings: no stored record, using defaults");
                self.generation = 0;
                self.next_slot = 0;
                self.current = Settings::default();
            }
        }
        self.current
    }

    /// Persist `settings`.
    ///
    /// On error the previously committed value stays both live and loadable.
    pub fn save(&mut self, storage: &mut impl StoragePort, settings: Settings) -> Result<(), StoreError> {
        let envelope = SlotEnvelope {
            generation: self.generation.wrapping_add(1),
            record: SettingsRecord::from_settings(settings),
        };
        let (buf, len) = encode_slot(&envelope)?;
        let key = SLOT_KEYS[self.next_slot];
        storage.write(NAMESPACE, key, &buf[..len]).inspect_err(|e| {
            warn!("Settings: write to {} failed: {}", key, e);
        })?;

        self.current = settings;
        self.generation = envelope.generation;
        self.next_slot = 1 - self.next_slot;
        info!(
            "Settings: saved gen {} to {} ({} ms, {})",
            self.generation,
            key,
            settings.actuation_delay_ms,
            settings.code_mode.label()
        );
        Ok(())
    }

    /// Apply one `PROGRAM_SETTINGS` change and persist the result.
    pub fn apply(
        &mut self,
        storage: &mut impl StoragePort,
        change: SettingsChange,
    ) -> Result<Settings, StoreError> {
        let updated = self.current.with_change(change);
        self.save(storage, updated)?;
        Ok(updated)
    }
}
