use std::fmt::Display;

use anyhow::{bail, Context};
use serde::{Deserialize, Deserializer, Serialize};

/// TCP port of the SMTP server
///
/// Accepts either a JSON number or a numeric string in the config file
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Clone, Copy)]
pub struct Port(u16);

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

impl Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Port> for u16 {
    fn from(value: Port) -> Self {
        value.0
    }
}

impl TryFrom<u64> for Port {
    type Error = anyhow::Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match u16::try_from(value) {
            Ok(0) => bail!("port must not be 0"),
            Ok(port) => Ok(Self(port)),
            Err(_) => bail!("port {value} is out of range"),
        }
    }
}

impl TryFrom<&str> for Port {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value: u64 = value
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse port from {value:?}"))?;
        value.try_into()
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let port = match PortValue::deserialize(deserializer)? {
            PortValue::Number(n) => Port::try_from(n),
            PortValue::Text(s) => Port::try_from(s.as_str()),
        };
        port.map_err(serde::de::Error::custom)
    }
}
