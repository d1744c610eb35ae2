//! Wi-Fi station credentials: validation and persistence.
//!
//! Stored as one postcard blob at `wifi/creds`. A missing or undecodable
//! blob reads as "no credentials"; the service then falls back to the
//! build-time defaults in [`ControllerConfig`](crate::config::ControllerConfig).

use heapless::String;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::StoragePort;
use crate::error::{LinkError, StoreError};

const NAMESPACE: &str = "wifi";
const KEY: &str = "creds";
const MAX_BLOB_LEN: usize = 128;

pub const MAX_SSID_LEN: usize = 32;
pub const MAX_PASSWORD_LEN: usize = 64;
const MIN_WPA2_PASSWORD_LEN: usize = 8;

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), LinkError> {
    if ssid.is_empty() || ssid.len() > MAX_SSID_LEN || !is_printable_ascii(ssid) {
        return Err(LinkError::InvalidSsid);
    }
    Ok(())
}

/// Empty means an open network.
pub fn validate_password(password: &str) -> Result<(), LinkError> {
    if password.is_empty() {
        return Ok(());
    }
    if !(MIN_WPA2_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password.len()) {
        return Err(LinkError::InvalidPassword);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
}

impl WifiCredentials {
    /// Validated credentials.
    pub fn new(ssid: &str, password: &str) -> Result<Self, LinkError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: String::new(),
            password: String::new(),
        };
        creds.ssid.push_str(ssid).map_err(|()| LinkError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|()| LinkError::InvalidPassword)?;
        Ok(creds)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        validate_ssid(&self.ssid)?;
        validate_password(&self.password)
    }

    /// Stored credentials, if present and valid.
    pub fn load(storage: &impl StoragePort) -> Option<Self> {
        let mut buf = [0u8; MAX_BLOB_LEN];
        let len = match storage.read(NAMESPACE, KEY, &mut buf) {
            Ok(len) => len,
            Err(StoreError::NotFound) => return None,
            Err(e) => {
                warn!("Credentials: read failed ({})", e);
                return None;
            }
        };
        match postcard::from_bytes::<Self>(&buf[..len]) {
            Ok(creds) if creds.validate().is_ok() => Some(creds),
            Ok(_) | Err(_) => {
                warn!("Credentials: stored blob invalid, ignoring");
                None
            }
        }
    }

    pub fn save(&self, storage: &mut impl StoragePort) -> Result<(), StoreError> {
        let mut buf = [0u8; MAX_BLOB_LEN];
        let bytes = postcard::to_slice(self, &mut buf).map_err(|_| StoreError::Io)?;
        storage.write(NAMESPACE, KEY, bytes)?;
        info!("Credentials: saved (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn forget(storage: &mut impl StoragePort) -> Result<(), StoreError> {
        storage.delete(NAMESPACE, KEY)?;
        info!("Credentials: forgotten");
        Ok(())
    }
}
