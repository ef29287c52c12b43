// Dependent-service probe: database port reachability plus an optional
// protocol-level round-trip

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use syshealth_core::domain::Category;
use syshealth_core::port::{Observation, Probe, ProbeContext};

/// Database connectivity check
///
/// Connects to host:port (MySQL's 3306 by default in the CLI wiring).
/// With `expect_greeting` set, also waits for the server to send its
/// protocol greeting: an open port that stays silent is a Warn - the
/// listener exists but may not be the database.
pub struct DatabaseProbe {
    name: String,
    host: String,
    port: u16,
    expect_greeting: bool,
}

impl DatabaseProbe {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            expect_greeting: false,
        }
    }

    pub fn expect_greeting(mut self) -> Self {
        self.expect_greeting = true;
        self
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Database
    }

    async fn run(&self, ctx: &ProbeContext) -> Observation {
        let addr = format!("{}:{}", self.host, self.port);

        let mut stream = match timeout(ctx.deadline, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Observation::fail(format!("database at {} unreachable: {}", addr, e)),
            Err(_) => {
                return Observation::fail(format!(
                    "connect to {} timed out after {}ms",
                    addr,
                    ctx.deadline.as_millis()
                ))
            }
        };

        if !self.expect_greeting {
            return Observation::pass(format!("database port {} is open", addr));
        }

        let mut greeting = [0u8; 128];
        match timeout(ctx.deadline, stream.read(&mut greeting)).await {
            Ok(Ok(n)) if n > 0 => {
                debug!(%addr, bytes = n, "database greeting received");
                Observation::pass(format!("database at {} answered ({}-byte greeting)", addr, n))
            }
            Ok(Ok(_)) => Observation::warn(format!(
                "port {} open but connection closed without a greeting",
                addr
            )),
            Ok(Err(e)) => Observation::warn(format!("port {} open but read failed: {}", addr, e)),
            Err(_) => Observation::warn(format!(
                "port {} open but no greeting within {}ms",
                addr,
                ctx.deadline.as_millis()
            )),
        }
    }
}
