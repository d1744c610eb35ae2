//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                 |
//! |------------|---------------------|-----------------------------|
//! | `hardware` | InputPort           | selector + limit switches   |
//! |            | OutputPort          | relay coils                 |
//! | `log_sink` | EventSink           | Serial log output           |
//! | `nvs`      | StoragePort         | NVS / in-memory store       |
//! | `time`     | (clock)             | ESP32 system timer          |
//! | `udp`      | DatagramTransport   | lwIP / host UDP socket      |
//! | `wifi`     | ConnectivityPort    | ESP-IDF Wi-Fi STA           |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod udp;
pub mod wifi;
