// src/collector/mod.rs

pub mod config;
pub mod registry;
pub mod router;

pub use config::RouterConfig;
pub use registry::{DeviceRegistry, RegistryError};
pub use router::{DispatchError, DispatchReport, DispatchStats, Router};

use crate::common::{
    error::Error,
    hal_traits::{Clock, RadioLink},
    limits::RADIO_PACKET_BUF_LEN,
};
use core::fmt::Debug;
use tracing::{debug, info};

/// Collector node: a radio link feeding a `Router`.
///
/// Polling style follows `nb`: `poll` handles at most one packet and reports
/// `WouldBlock` when the radio has nothing, so it can sit in a main loop or
/// behind `nb::block!`.
pub struct Collector<R, C>
where
    R: RadioLink,
    C: Clock,
{
    radio: R,
    router: Router<C>,
    buf: [u8; RADIO_PACKET_BUF_LEN],
}

impl<R, C> Debug for Collector<R, C>
where
    R: RadioLink + Debug,
    C: Clock,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collector")
            .field("radio", &self.radio)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl<R, C> Collector<R, C>
where
    R: RadioLink,
    C: Clock,
{
    /// Validates `config`, brings up the radio and returns a collector ready to poll.
    ///
    /// Use `Error::return_code` for the numeric status: `RC_CONFIG` when the
    /// configuration is rejected, `RC_INIT` when the radio fails to start.
    pub fn start(mut radio: R, clock: C, config: RouterConfig) -> Result<Self, Error<R::Error>> {
        let router = Router::new(clock, &config)?;
        radio.init().map_err(Error::Init)?;
        info!(
            type_mask = config.default_type_mask.bits(),
            max_devices = ?config.max_devices,
            queue_capacity = config.queue_capacity,
            "remote sensor collector started"
        );
        Ok(Collector { radio, router, buf: [0u8; RADIO_PACKET_BUF_LEN] })
    }

    pub fn router(&self) -> &Router<C> {
        &self.router
    }

    pub fn registry(&self) -> &DeviceRegistry {
        self.router.registry()
    }

    /// Receives and dispatches at most one packet.
    ///
    /// Returns `Ok(Some(report))` for a delivered message and `Ok(None)` for a
    /// message that was dropped (already counted in the router stats). Radio
    /// errors and `WouldBlock` pass through.
    pub fn poll(&mut self) -> nb::Result<Option<DispatchReport>, R::Error> {
        let packet = self.radio.receive(&mut self.buf)?;
        let len = packet.len.min(self.buf.len());
        debug!(sender = %packet.sender, len, "packet received");
        Ok(self
            .router
            .on_message_received(packet.sender.as_str(), &self.buf[..len])
            .ok())
    }

    /// Polls until the radio has nothing more, returning the number of packets handled.
    pub fn run_until_idle(&mut self) -> Result<usize, R::Error> {
        let mut handled = 0;
        loop {
            match self.poll() {
                Ok(_) => handled += 1,
                Err(nb::Error::WouldBlock) => return Ok(handled),
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }

    /// Stops the collector and hands the radio back.
    pub fn release(self) -> R {
        self.radio
    }
}
