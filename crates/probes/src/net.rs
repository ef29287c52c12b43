// Network probes: TCP reachability, ICMP ping, and DNS resolution

use std::time::Instant;

use async_trait::async_trait;
use tokio::net::{lookup_host, TcpStream};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use syshealth_core::domain::Category;
use syshealth_core::port::{Observation, Probe, ProbeContext};

/// Reachability check: can we open a TCP connection to host:port?
///
/// The classic internet check connects to 8.8.8.8:53. A refused or
/// timed-out connection is a Fail (the condition was evaluated and is
/// negative), not an Error.
pub struct TcpConnectProbe {
    name: String,
    host: String,
    port: u16,
}

impl TcpConnectProbe {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl Probe for TcpConnectProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Network
    }

    async fn run(&self, ctx: &ProbeContext) -> Observation {
        let addr = format!("{}:{}", self.host, self.port);
        let started = Instant::now();

        match timeout(ctx.deadline, TcpStream::connect(&addr)).await {
            Ok(Ok(_stream)) => {
                let elapsed = started.elapsed().as_millis();
                debug!(%addr, elapsed_ms = elapsed as u64, "tcp connect ok");
                Observation::pass(format!("connected to {} in {}ms", addr, elapsed))
            }
            Ok(Err(e)) => Observation::fail(format!("cannot reach {}: {}", addr, e)),
            Err(_) => Observation::fail(format!(
                "connect to {} timed out after {}ms",
                addr,
                ctx.deadline.as_millis()
            )),
        }
    }
}

const DEFAULT_PING: &str = "ping";

/// ICMP reachability check via the system ping binary
///
/// Complements the TCP connect check: a host can drop ICMP but answer
/// TCP, or the reverse. Exit code 0 from `ping -c 1 <host>` is a Pass,
/// any other exit a Fail; not being able to run ping at all is an
/// Error. The binary name is a field so tests can substitute a stub.
pub struct PingProbe {
    name: String,
    host: String,
    program: String,
}

impl PingProbe {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            program: DEFAULT_PING.to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl Probe for PingProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Network
    }

    async fn run(&self, ctx: &ProbeContext) -> Observation {
        // kill_on_drop: ping against a blackholed host must not outlive
        // the deadline
        let output = timeout(
            ctx.deadline,
            Command::new(&self.program)
                .arg("-c")
                .arg("1")
                .arg(&self.host)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match output {
            Err(_) => Observation::fail(format!(
                "no ping reply from {} within {}ms",
                self.host,
                ctx.deadline.as_millis()
            )),
            Ok(Ok(output)) if output.status.success() => {
                debug!(host = %self.host, "ping ok");
                Observation::pass(format!("{} answered ping", self.host))
            }
            Ok(Ok(_)) => Observation::fail(format!("{} did not answer ping", self.host)),
            Ok(Err(e)) => Observation::error(format!("cannot invoke {}: {}", self.program, e)),
        }
    }
}

/// Name resolution check: does the hostname resolve to an address?
pub struct DnsProbe {
    name: String,
    hostname: String,
}

impl DnsProbe {
    pub fn new(name: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
        }
    }
}

#[async_trait]
impl Probe for DnsProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Network
    }

    async fn run(&self, _ctx: &ProbeContext) -> Observation {
        match lookup_host((self.hostname.as_str(), 0u16)).await {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => {
                    Observation::pass(format!("{} resolved to {}", self.hostname, addr.ip()))
                }
                None => Observation::fail(format!("{} resolved to no addresses", self.hostname)),
            },
            Err(e) => Observation::fail(format!("cannot resolve {}: {}", self.hostname, e)),
        }
    }
}
