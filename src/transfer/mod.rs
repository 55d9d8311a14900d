//! Transfer module for FTP server
//!
//! Data connections for file transfers: the shared contract, active and
//! passive providers, the readiness gate behind passive accepts, TLS
//! wrapping, and the per-session registry used by PASV/PORT handling.

pub mod active;
pub mod channel_registry;
pub mod connection;
pub mod gate;
pub mod modes;
pub mod operations;
pub mod passive;
pub mod results;
pub mod stream;
pub mod tls;

// Re-export key types and functions
pub use active::ActiveConnection;
pub use channel_registry::{ChannelEntry, ChannelRegistry};
pub use connection::DataConnection;
pub use gate::{GateStatus, ReadinessGate};
pub use modes::TransferMode;
pub use operations::{
    epsv_reply, parse_port_argument, pasv_reply, setup_active_mode, setup_passive_mode,
};
pub use passive::PassiveConnection;
pub use results::{ActiveModeResult, PassiveModeResult};
pub use stream::DataStream;
