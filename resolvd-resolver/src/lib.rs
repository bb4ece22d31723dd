pub mod config;
pub mod error;
pub mod facade;
pub mod forward;
pub mod iterative;
pub mod metrics;
pub mod roots;
pub mod transport;

pub use error::ResolverError;
pub use facade::{DnssecSummary, ResolveMode, ResolveOutcome, ResolverFacade, Source};
pub use forward::ForwardResolver;
pub use iterative::IterativeResolver;
pub use metrics::{MetricEntry, Metrics, Status};
pub use roots::{random_root_server, ROOT_SERVERS};
pub use transport::{DohTransport, UdpTransport};
