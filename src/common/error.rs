// src/common/error.rs

use core::fmt::Debug;

/// Return code for a successful setup call.
pub const RC_OK: i32 = 0;
/// Return code when a configuration (type mask, address, limits) is rejected.
pub const RC_CONFIG: i32 = 1;
/// Return code when the radio link fails to initialize.
pub const RC_INIT: i32 = 2;

/// A rejected remote sensor or router configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Address is empty or longer than `MAX_ADDR_LEN`.
    #[error("Invalid sensor address length: {0}")]
    InvalidAddressLength(usize),

    /// Address contains a character outside `[0-9a-zA-Z-_:.]`.
    #[error("Invalid sensor address character: '{0}'")]
    InvalidAddressChar(char),

    /// Accepted-type mask selects nothing.
    #[error("Sensor type mask is empty")]
    EmptyTypeMask,

    /// Accepted-type mask has bits that match no known sensor type.
    #[error("Sensor type mask has unknown bits: {0:#010x}")]
    UnknownTypeBits(u32),

    /// The config's address differs from the device it is applied to.
    #[error("Config address does not match the device address")]
    AddressMismatch,

    /// Per-device queue capacity must be non-zero.
    #[error("Invalid queue capacity: {0}")]
    InvalidQueueCapacity(usize),

    /// A device limit of zero would reject every sender.
    #[error("Device limit must be at least 1")]
    InvalidDeviceLimit,
}

/// Error returned from the setup entry points (`Collector::start`, configuration).
///
/// The dispatch path never returns this type; see `collector::DispatchError`.
#[derive(Debug, thiserror::Error)]
pub enum Error<E = ()>
where
    E: Debug,
{
    /// Configuration was rejected before anything was started.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The radio link failed to initialize.
    #[error("Initialization error: {0:?}")]
    Init(E),
}

impl<E: Debug> Error<E> {
    /// Distinct non-zero return code for this failure class.
    pub fn return_code(&self) -> i32 {
        match self {
            Error::Config(_) => RC_CONFIG,
            Error::Init(_) => RC_INIT,
        }
    }
}

/// Maps a setup result onto the `0` / `RC_CONFIG` / `RC_INIT` convention.
pub fn return_code<T, E: Debug>(result: &Result<T, Error<E>>) -> i32 {
    match result {
        Ok(_) => RC_OK,
        Err(e) => e.return_code(),
    }
}
