//! Component registry: the fixed table of addressable relays and inputs.
//!
//! Every component has a stable wire id (`0x00..=0x07`), the GPIO it lives
//! on, and its last known logical value. Relay values are written on
//! actuation; input values are refreshed from the switch snapshot each loop
//! iteration. The registry is owned by the
//! [`ActuationEngine`](crate::actuation::ActuationEngine); everything else
//! reads it through shared references.

use serde::{Deserialize, Serialize};

use crate::pins;
use crate::protocol::codes;

/// Stable identifier of an addressable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentId {
    Connection = codes::CONNECTION,
    Relay1 = codes::RELAY1,
    Relay2 = codes::RELAY2,
    Relay3 = codes::RELAY3,
    Relay4 = codes::RELAY4,
    FuncMode = codes::FUNC_MODE,
    TopSwitch = codes::TOP_SWITCH,
    BottomSwitch = codes::BOTTOM_SWITCH,
}

impl ComponentId {
    /// Number of ids, and therefore registry slots.
    pub const COUNT: usize = 8;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Connection,
        Self::Relay1,
        Self::Relay2,
        Self::Relay3,
        Self::Relay4,
        Self::FuncMode,
        Self::TopSwitch,
        Self::BottomSwitch,
    ];

    /// Wire id → component. `None` for ids outside the registry.
    pub fn from_wire(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub const fn wire(self) -> u8 {
        self as u8
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The relay behind this id, if it is one.
    pub const fn relay(self) -> Option<Relay> {
        match self {
            Self::Relay1 => Some(Relay::R1),
            Self::Relay2 => Some(Relay::R2),
            Self::Relay3 => Some(Relay::R3),
            Self::Relay4 => Some(Relay::R4),
            _ => None,
        }
    }

    const fn default_pin(self) -> i32 {
        match self {
            Self::Connection => pins::ACTIVE_LED_GPIO,
            Self::Relay1 => pins::RELAY_1_GPIO,
            Self::Relay2 => pins::RELAY_2_GPIO,
            Self::Relay3 => pins::RELAY_3_GPIO,
            Self::Relay4 => pins::RELAY_4_GPIO,
            Self::FuncMode => pins::FUNC_MODE_GPIO,
            Self::TopSwitch => pins::TOP_SWITCH_GPIO,
            Self::BottomSwitch => pins::BOTTOM_SWITCH_GPIO,
        }
    }
}

/// One of the four relay outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relay {
    R1,
    R2,
    R3,
    R4,
}

impl Relay {
    pub const ALL: [Self; 4] = [Self::R1, Self::R2, Self::R3, Self::R4];

    /// Zero-based index into the relay bank.
    pub const fn index(self) -> usize {
        match self {
            Self::R1 => 0,
            Self::R2 => 1,
            Self::R3 => 2,
            Self::R4 => 3,
        }
    }

    pub const fn component(self) -> ComponentId {
        match self {
            Self::R1 => ComponentId::Relay1,
            Self::R2 => ComponentId::Relay2,
            Self::R3 => ComponentId::Relay3,
            Self::R4 => ComponentId::Relay4,
        }
    }
}

/// A registry slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub id: ComponentId,
    pub pin: i32,
    /// Logical value: 1 = energised / closed / up, 0 otherwise.
    pub value: u8,
}

/// Fixed-size table indexed by [`ComponentId`].
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    slots: [Component; ComponentId::COUNT],
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Registry with every component at value 0 on its board pin.
    pub fn new() -> Self {
        Self {
            slots: ComponentId::ALL.map(|id| Component {
                id,
                pin: id.default_pin(),
                value: 0,
            }),
        }
    }

    pub fn get(&self, id: ComponentId) -> &Component {
        &self.slots[id.index()]
    }

    pub fn value(&self, id: ComponentId) -> u8 {
        self.slots[id.index()].value
    }

    pub(crate) fn set(&mut self, id: ComponentId, on: bool) {
        self.slots[id.index()].value = u8::from(on);
    }
}
