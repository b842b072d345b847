// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod address;
pub mod error;
pub mod hal_traits;
pub mod limits;
pub mod sync;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From address.rs
pub use address::SensorAddr;

// From error.rs
pub use error::{ConfigError, Error, RC_CONFIG, RC_INIT, RC_OK};

// From hal_traits.rs
pub use hal_traits::{Clock, Packet, RadioLink, Timestamp};

#[cfg(feature = "std")]
pub use hal_traits::StdClock;

// From types.rs
pub use types::{SensorTypeMask, SensorTypeTag};
