//! Wire helpers for Zabbix's loosely typed scalars.
//!
//! The API returns numeric enums and flags as strings (`"1"`) but accepts
//! integers on input. Decoding tolerates both; encoding always emits integers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Any scalar the API may use for a number or flag.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl Loose {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Kind of a host interface (`type` on the wire).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    #[default]
    Agent,
    Snmp,
    Ipmi,
    Jmx,
    Other(i64),
}

impl InterfaceKind {
    /// Numeric wire code.
    pub const fn code(self) -> i64 {
        match self {
            Self::Agent => 1,
            Self::Snmp => 2,
            Self::Ipmi => 3,
            Self::Jmx => 4,
            Self::Other(code) => code,
        }
    }

    /// Decode a wire code.
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Agent,
            2 => Self::Snmp,
            3 => Self::Ipmi,
            4 => Self::Jmx,
            other => Self::Other(other),
        }
    }
}

impl Serialize for InterfaceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for InterfaceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Loose::deserialize(deserializer)?;
        raw.as_i64()
            .map(Self::from_code)
            .ok_or_else(|| serde::de::Error::custom("interface type must be numeric"))
    }
}

/// `0`/`1` flags such as `main` and `useip`.
pub mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Loose;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = Loose::deserialize(deserializer)?;
        raw.as_i64()
            .map(|n| n != 0)
            .ok_or_else(|| serde::de::Error::custom("flag must be 0 or 1"))
    }
}
