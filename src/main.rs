use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use dnscheck::{
    CheckConfig, DomainChecker, PublicSuffixList, http_server::HttpServer, logging,
    transport::NetworkTransport,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dnscheck", version, about = "DNS and DNSSEC posture checker API")]
struct Args {
    /// Override the bind host (DNSCHECK_HTTP_BIND_ADDR)
    #[arg(long)]
    host: Option<std::net::IpAddr>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("info");
    let args = Args::parse();

    let mut config = CheckConfig::from_env()?;
    if let Some(host) = args.host {
        config.http_bind_addr = SocketAddr::new(host, config.http_bind_addr.port());
    }
    if let Some(port) = args.port {
        config.http_bind_addr.set_port(port);
    }

    info!(
        "Resolver {}, default nameserver {}, timeout {:?}",
        config.recursive_resolver, config.default_nameserver, config.query_timeout
    );

    let psl = Arc::new(PublicSuffixList::load(&config).await?);
    let bind_addr = config.http_bind_addr;
    let checker = Arc::new(DomainChecker::new(
        config,
        Arc::new(NetworkTransport::new()),
        psl,
    ));

    HttpServer::new(checker, bind_addr).start().await
}
