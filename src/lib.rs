//! ICMP echo probing over raw sockets.
//!
//! A [`ProbeSession`] sends hand-built Echo Requests to one destination,
//! matches replies by identifier and sequence number within a per-probe
//! deadline, and reports every outcome plus a final [`Summary`] to a
//! [`ReportSink`].
//!
//! ```no_run
//! use rawping::{ConsoleReporter, ProbeConfig, ProbeSession};
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! let config = ProbeConfig { count: 4, ..Default::default() };
//! let session = ProbeSession::open("1.1.1.1", config, Arc::new(AtomicBool::new(false)))?;
//! let summary = session.run(&mut ConsoleReporter::stdout());
//! println!("{} of {} answered", summary.received, summary.sent);
//! # Ok::<(), rawping::ProbeError>(())
//! ```

pub mod channel;
pub mod checksum;
pub mod config;
pub mod error;
pub mod messages;
pub mod packet;
pub mod report;
pub mod resolver;
pub mod session;
pub mod stats;

pub use channel::{EchoChannel, Inbound, RawIcmpChannel};
pub use config::ProbeConfig;
pub use error::{ProbeError, Result};
pub use messages::{EchoReply, EchoRequest, ProbeEvent, ProbeOutcome};
pub use report::{ConsoleReporter, ReportSink};
pub use resolver::{resolve, Destination};
pub use session::ProbeSession;
pub use stats::{RttSummary, SessionStats, Summary};
