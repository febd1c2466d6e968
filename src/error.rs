use std::io;

/// Everything that can go wrong while probing a destination.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("cannot resolve {0}: Unknown host")]
    UnresolvedHost(String),

    #[error("Operation not permitted: ICMP messages can only be sent from a process running as root")]
    PermissionDenied,

    #[error("unable to create raw ICMP channel: {0}")]
    Channel(io::Error),

    #[error("send failed: {0}")]
    Transmit(io::Error),

    #[error("receive failed: {0}")]
    Receive(io::Error),

    #[error("malformed packet: {len} bytes")]
    MalformedPacket { len: usize },
}

impl ProbeError {
    /// Errors after which the process should stop instead of moving on to
    /// the next destination.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProbeError::Configuration(_) | ProbeError::PermissionDenied | ProbeError::Channel(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_host_is_not_fatal() {
        assert!(!ProbeError::UnresolvedHost("nowhere".into()).is_fatal());
        assert!(ProbeError::PermissionDenied.is_fatal());
        assert!(ProbeError::Configuration("count".into()).is_fatal());
    }

    #[test]
    fn unresolved_host_message() {
        let err = ProbeError::UnresolvedHost("nowhere.invalid".into());
        assert_eq!(err.to_string(), "cannot resolve nowhere.invalid: Unknown host");
    }
}
