pub mod doh;
pub mod udp;

pub use doh::DohTransport;
pub use udp::UdpTransport;

use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
