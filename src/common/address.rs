// src/common/address.rs

use super::error::ConfigError;
use super::limits::MAX_ADDR_LEN;
use core::borrow::Borrow;
use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;
use heapless::String;

/// Address of a remote sensor node, as reported by the radio link.
///
/// nRF24L01 pipe addresses are usually written as hex (`b3b4b5b6f1`), but any
/// short ASCII identifier is accepted (`node-1`, `aa:bb:cc`).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SensorAddr(String<MAX_ADDR_LEN>);

impl SensorAddr {
    /// Creates a new `SensorAddr` if every character is a valid address character
    /// and the length is within `1..=MAX_ADDR_LEN`.
    pub fn new(addr: &str) -> Result<Self, ConfigError> {
        if addr.is_empty() || addr.len() > MAX_ADDR_LEN {
            return Err(ConfigError::InvalidAddressLength(addr.len()));
        }
        if let Some(c) = addr.chars().find(|c| !Self::is_valid_address_char(*c)) {
            return Err(ConfigError::InvalidAddressChar(c));
        }
        let mut inner = String::new();
        // Length was checked above, so this cannot overflow.
        inner
            .push_str(addr)
            .map_err(|_| ConfigError::InvalidAddressLength(addr.len()))?;
        Ok(SensorAddr(inner))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[inline]
    pub const fn is_valid_address_char(c: char) -> bool {
        matches!(c, '0'..='9' | 'a'..='z' | 'A'..='Z' | '-' | '_' | ':' | '.')
    }
}

impl TryFrom<&str> for SensorAddr {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for SensorAddr {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SensorAddr {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// Lets maps keyed by `SensorAddr` be queried with a plain `&str`.
impl Borrow<str> for SensorAddr {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SensorAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_valid_addresses() {
        assert!(SensorAddr::new("node-1").is_ok());
        assert!(SensorAddr::new("b3b4b5b6f1").is_ok());
        assert!(SensorAddr::new("aa:bb:cc").is_ok());
        assert!(SensorAddr::new("N_2.x").is_ok());
        assert!(SensorAddr::new("0123456789abcdef").is_ok()); // exactly MAX_ADDR_LEN
    }

    #[test]
    fn test_invalid_addresses() {
        assert_eq!(SensorAddr::new(""), Err(ConfigError::InvalidAddressLength(0)));
        assert_eq!(
            SensorAddr::new("0123456789abcdefg"),
            Err(ConfigError::InvalidAddressLength(17))
        );
        assert_eq!(SensorAddr::new("node 1"), Err(ConfigError::InvalidAddressChar(' ')));
        assert_eq!(SensorAddr::new("node/1"), Err(ConfigError::InvalidAddressChar('/')));
        assert_eq!(SensorAddr::new("nodé"), Err(ConfigError::InvalidAddressChar('é')));
    }

    #[test]
    fn test_try_from_and_parse() {
        assert_eq!(SensorAddr::try_from("node-2").unwrap().as_str(), "node-2");
        assert_eq!("f1".parse::<SensorAddr>().unwrap().as_str(), "f1");
        assert!("*".parse::<SensorAddr>().is_err());
    }

    #[test]
    fn test_display_and_ordering() {
        let a = SensorAddr::new("node-1").unwrap();
        let b = SensorAddr::new("node-2").unwrap();
        assert_eq!(a.to_string(), "node-1");
        assert!(a < b);
        assert_eq!(a, SensorAddr::new("node-1").unwrap());
        assert_ne!(a, SensorAddr::new("NODE-1").unwrap());
    }
}
