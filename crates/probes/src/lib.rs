// Syshealth Probes - infrastructure adapters implementing the Probe port
//
// Each probe maps a native outcome (socket connect, resolver answer,
// subprocess verdict, sysinfo reading) onto the five-state status enum.

pub mod database;
pub mod disk;
pub mod net;
pub mod resources;
pub mod service;

pub use database::DatabaseProbe;
pub use disk::DiskSpaceProbe;
pub use net::{DnsProbe, PingProbe, TcpConnectProbe};
pub use resources::{LoadAverageProbe, MemoryProbe, ProcessHotlistProbe};
pub use service::ServiceProbe;
