mod network;
mod stats;

use crate::network::Status;
use crate::stats::Info as Stats;

/// Tests the multi-module and import aliasing case.
pub struct MultiModule {
    /// Network status.
    pub net_status: Status,
    /// Statistics info.
    #[serde(flatten)]
    pub info: Stats,
}

impl Default for MultiModule {
    fn default() -> Self {
        Self {
            net_status: Status {
                connected: true,
                state: network::State::Disconnected,
            },
            info: Stats {
                packet_loss: 32 * 2,
                round_trip_time: 123,
            },
        }
    }
}
