pub mod check;
pub mod config;
pub mod dns;
pub mod dnssec;
pub mod error;
pub mod http_server;
pub mod logging;
pub mod psl;
pub mod transport;

pub use check::{
    CheckFailure, DomainChecker,
    report::{CheckStatus, Finding, Report},
};
pub use config::CheckConfig;
pub use dns::DNSPacket;
pub use error::{CheckError, ConfigError};
pub use psl::PublicSuffixList;
