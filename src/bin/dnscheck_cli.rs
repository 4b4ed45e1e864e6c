use std::{process::ExitCode, sync::Arc};

use clap::{Parser, ValueEnum};
use dnscheck::{
    CheckConfig, DomainChecker, PublicSuffixList, Report, logging, transport::NetworkTransport,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "dnscheck-cli", version, about = "Check the DNS posture of one domain")]
struct Args {
    /// Domain to check
    #[arg(short, long)]
    domain: String,

    /// Starting nameserver, IP or hostname (defaults to DNSCHECK_NAMESERVER)
    #[arg(short, long)]
    nameserver: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    logging::init("warn");
    let args = Args::parse();

    let config = CheckConfig::from_env()?;
    let psl = Arc::new(PublicSuffixList::load(&config).await?);
    let checker = DomainChecker::new(config, Arc::new(NetworkTransport::new()), psl);

    let (report, code) = match checker
        .check_domain(&args.domain, args.nameserver.as_deref())
        .await
    {
        Ok(report) => (report, ExitCode::SUCCESS),
        Err(failure) => (*failure.report, ExitCode::FAILURE),
    };

    print_report(&report, args.output)?;
    Ok(code)
}

fn print_report(report: &Report, format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => println!("{}", report),
    }
    Ok(())
}
