//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] over the ESP-IDF NVS partition, or over an
//! in-memory map on the host.
//!
//! - Namespace isolation: each subsystem uses its own namespace
//!   (`settings`, `wifi`).
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.

use crate::app::ports::StoragePort;
use crate::error::StoreError;
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

/// NVS limits namespace and key names to 15 bytes plus NUL.
#[cfg(target_os = "espidf")]
const NVS_NAME_BUF: usize = 16;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is erased
    /// and re-initialised automatically.
    pub fn new() -> Result<Self, StoreError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NvsAdapter: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StoreError::Io);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StoreError::Io);
                }
            } else if ret != ESP_OK {
                return Err(StoreError::Io);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of an NVS name, truncated to 15 bytes.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_NAME_BUF] {
        let mut buf = [0u8; NVS_NAME_BUF];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NVS_NAME_BUF - 1);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn map_esp_err(code: i32) -> StoreError {
        match code {
            ESP_ERR_NVS_NOT_FOUND => StoreError::NotFound,
            ESP_ERR_NVS_NOT_ENOUGH_SPACE => StoreError::Full,
            _ => StoreError::Io,
        }
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StoreError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_name(key);
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            })
            .map_err(Self::map_esp_err)
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            })
            .map_err(|e| {
                warn!("NvsAdapter: write {}::{} failed ({})", namespace, key, e);
                Self::map_esp_err(e)
            })
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StoreError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe { nvs_erase_key(handle, key_buf.as_ptr() as *const _) };
                if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            })
            .map_err(Self::map_esp_err)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow().contains_key(&composite)
        }

        #[cfg(target_os = "espidf")]
        {
            Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe {
                    nvs_find_key(handle, key_buf.as_ptr() as *const _, core::ptr::null_mut())
                };
                Ok(ret == ESP_OK)
            })
            .unwrap_or(false)
        }
    }
}
