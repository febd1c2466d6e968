use clap::Parser;
use rawping::config::{DEFAULT_COUNT, DEFAULT_INTERVAL_MS, DEFAULT_PAYLOAD_SIZE, DEFAULT_TIMEOUT_MS, DEFAULT_TTL};
use rawping::{ConsoleReporter, ProbeConfig, ProbeSession};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Send ICMP echo requests over a raw socket", long_about = None)]
struct Args {
    /// Hosts to ping, one after another
    #[arg(required_unless_present = "destination")]
    hosts: Vec<String>,

    /// Hosts to ping (same as the positional form)
    #[arg(short, long, num_args = 1..)]
    destination: Vec<String>,

    /// Number of echo requests per host
    #[arg(short, long, default_value_t = DEFAULT_COUNT)]
    count: u32,

    /// Time to wait for each reply, in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout: u64,

    /// Payload bytes per request
    #[arg(short, long, default_value_t = DEFAULT_PAYLOAD_SIZE)]
    packet_size: usize,

    /// Minimum time between requests, in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Time to live of outgoing packets
    #[arg(long, default_value_t = DEFAULT_TTL)]
    ttl: u8,
}

impl Args {
    fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            count: self.count,
            timeout: Duration::from_millis(self.timeout),
            payload_size: self.packet_size,
            interval: Duration::from_millis(self.interval),
            ttl: self.ttl,
        }
    }

    fn targets(&self) -> impl Iterator<Item = &String> {
        self.destination.iter().chain(self.hosts.iter())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = args.probe_config();
    if let Err(e) = config.validate() {
        eprintln!("ping: {}", e);
        process::exit(2);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("failed to install Ctrl+C handler: {}", e);
    }

    let mut unresolved = 0;
    for host in args.targets() {
        if interrupted.load(Ordering::SeqCst) {
            info!("interrupted, skipping {}", host);
            break;
        }

        match ProbeSession::open(host, config.clone(), Arc::clone(&interrupted)) {
            Ok(session) => {
                session.run(&mut ConsoleReporter::stdout());
            }
            Err(e) if !e.is_fatal() => {
                eprintln!("ping: {}", e);
                unresolved += 1;
            }
            Err(e) => {
                eprintln!("ping: {}", e);
                process::exit(1);
            }
        }
    }

    if unresolved > 0 {
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_probe_config() {
        let args = Args::try_parse_from(["rawping", "example.com"]).unwrap();
        assert_eq!(args.probe_config(), ProbeConfig::default());
        assert_eq!(args.targets().collect::<Vec<_>>(), ["example.com"]);
    }

    #[test]
    fn destination_flag_takes_several_hosts() {
        let args = Args::try_parse_from(["rawping", "-d", "a.test", "b.test", "-c", "3", "-t", "250", "-p", "100"]).unwrap();
        assert_eq!(args.targets().collect::<Vec<_>>(), ["a.test", "b.test"]);

        let config = args.probe_config();
        assert_eq!(config.count, 3);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.payload_size, 100);
    }

    #[test]
    fn a_host_is_required() {
        assert!(Args::try_parse_from(["rawping"]).is_err());
    }
}
