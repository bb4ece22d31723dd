use std::fmt;

/// The abstract error kinds from §7. Transports surface `Timeout` /
/// `TransportError`; the codec surfaces `MalformedPacket`; the iterative
/// resolver surfaces `NoDelegation` / `HopLimitExceeded` / `Unreachable`;
/// storage construction surfaces `BackendUnavailable`.
#[derive(Debug)]
pub enum ResolverError {
    Timeout,
    TransportError(String),
    MalformedPacket(String),
    NoDelegation,
    HopLimitExceeded,
    Unreachable,
    BackendUnavailable(String),
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "transport timed out"),
            Self::TransportError(reason) => write!(f, "transport error: {reason}"),
            Self::MalformedPacket(reason) => write!(f, "malformed packet: {reason}"),
            Self::NoDelegation => write!(f, "no usable delegation found"),
            Self::HopLimitExceeded => write!(f, "hop or query limit exceeded"),
            Self::Unreachable => write!(f, "authoritative server did not respond"),
            Self::BackendUnavailable(reason) => write!(f, "storage backend unavailable: {reason}"),
        }
    }
}

impl std::error::Error for ResolverError {}

impl From<resolvd_proto::ProtoError> for ResolverError {
    fn from(err: resolvd_proto::ProtoError) -> Self {
        Self::MalformedPacket(err.to_string())
    }
}

impl From<std::io::Error> for ResolverError {
    fn from(err: std::io::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}
