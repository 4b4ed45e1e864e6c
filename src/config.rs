use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Recursive resolver used for the reachability gate and record lookups
    pub recursive_resolver: SocketAddr,

    /// Starting nameserver for the delegation walk when the caller gives none
    /// (IP address or hostname)
    pub default_nameserver: String,

    /// Timeout applied to every outbound query
    pub query_timeout: Duration,

    /// EDNS0 payload size advertised on DNSSEC-relevant queries
    pub edns_payload_size: u16,

    /// Upper bound on concurrently running per-MX lookups
    pub max_concurrent_lookups: usize,

    /// HTTP API bind address
    pub http_bind_addr: SocketAddr,

    /// Public suffix list file replacing the embedded copy
    pub psl_path: Option<PathBuf>,

    /// Download the public suffix list at startup
    pub psl_fetch: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            recursive_resolver: "8.8.8.8:53"
                .parse()
                .expect("Default resolver address is valid"),
            default_nameserver: "8.8.8.8".to_string(),
            query_timeout: Duration::from_secs(5),
            edns_payload_size: 4096,
            max_concurrent_lookups: 8,
            http_bind_addr: "127.0.0.1:4004"
                .parse()
                .expect("Default bind address is valid"),
            psl_path: None,
            psl_fetch: false,
        }
    }
}

impl CheckConfig {
    /// Load configuration from `DNSCHECK_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(resolver) = lookup("DNSCHECK_RECURSIVE_RESOLVER") {
            config.recursive_resolver = parse_resolver(&resolver)
                .ok_or(ConfigError::InvalidResolver(resolver))?;
        }

        if let Some(nameserver) = lookup("DNSCHECK_NAMESERVER") {
            let nameserver = nameserver.trim();
            if nameserver.is_empty() {
                return Err(ConfigError::InvalidResolver(
                    "Nameserver must not be empty".to_string(),
                ));
            }
            config.default_nameserver = nameserver.to_string();
        }

        if let Some(timeout_str) = lookup("DNSCHECK_QUERY_TIMEOUT") {
            let timeout_secs = timeout_str
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(timeout_str.clone()))?;
            config.query_timeout = Duration::from_secs(timeout_secs);
        }

        if let Some(size_str) = lookup("DNSCHECK_EDNS_PAYLOAD_SIZE") {
            config.edns_payload_size = size_str
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPayloadSize(size_str.clone()))?;
        }

        if let Some(limit_str) = lookup("DNSCHECK_MAX_CONCURRENT_LOOKUPS") {
            config.max_concurrent_lookups = limit_str
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidConcurrency(limit_str.clone()))?;
        }

        if let Some(bind_addr) = lookup("DNSCHECK_HTTP_BIND_ADDR") {
            config.http_bind_addr = bind_addr
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddress(bind_addr))?;
        }

        if let Some(path) = lookup("DNSCHECK_PSL_PATH") {
            if !path.trim().is_empty() {
                config.psl_path = Some(PathBuf::from(path));
            }
        }

        if let Some(fetch) = lookup("DNSCHECK_PSL_FETCH") {
            config.psl_fetch = parse_bool(&fetch, config.psl_fetch);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        // Smaller than the classic UDP limit makes EDNS pointless
        if self.edns_payload_size < 512 {
            return Err(ConfigError::InvalidPayloadSize(format!(
                "{} is below the 512 byte minimum",
                self.edns_payload_size
            )));
        }

        if self.max_concurrent_lookups == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "Concurrency limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Accepts `ip:port` or a bare IP (port 53).
pub fn parse_resolver(value: &str) -> Option<SocketAddr> {
    let value = value.trim();
    value
        .parse::<SocketAddr>()
        .ok()
        .or_else(|| value.parse::<std::net::IpAddr>().ok().map(|ip| SocketAddr::new(ip, 53)))
}

/// Parse a boolean value from a string
fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
