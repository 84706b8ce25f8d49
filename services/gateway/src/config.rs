use matching_engine::MatchPolicy;
use signing::SigningDomain;
use std::fmt::{self, Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Command line arguments for the venue gateway.
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "gateway", about = "Graded-card venue order gateway")]
pub struct Arguments {
    /// Address the HTTP API listens on.
    #[clap(long, env, default_value = "0.0.0.0:8080")]
    pub bind_address: SocketAddr,

    /// Secret all custodial signing identities are derived from.
    #[clap(long, env, hide_env_values = true)]
    pub master_secret: String,

    /// Signing domain: venue name.
    #[clap(long, env, default_value = "GradedCardVenue")]
    pub venue_name: String,

    /// Signing domain: venue version.
    #[clap(long, env, default_value = "1")]
    pub venue_version: String,

    /// Signing domain: network identifier.
    #[clap(long, env, default_value = "1")]
    pub network_id: u64,

    /// Signing domain: address of the settlement contract.
    #[clap(
        long,
        env,
        default_value = "0x0000000000000000000000000000000000000000"
    )]
    pub settlement_contract: String,

    /// Base URL of a remote settlement authority. The in-process ledger is
    /// used when unset.
    #[clap(long, env)]
    pub settlement_url: Option<String>,

    /// Upper bound on a single settlement attempt.
    #[clap(long, env, default_value = "10s", value_parser = humantime::parse_duration)]
    pub settlement_timeout: Duration,

    /// Journal file backing the order book. The book is memory-only when unset.
    #[clap(long, env)]
    pub journal_path: Option<PathBuf>,

    /// Choice among several eligible resting orders: first-fit or price-time.
    #[clap(long, env, default_value = "first-fit", value_parser = parse_match_policy)]
    pub match_policy: MatchPolicy,

    /// How often expired resting orders are evicted.
    #[clap(long, env, default_value = "60s", value_parser = humantime::parse_duration)]
    pub expiry_sweep_interval: Duration,

    /// Order submissions a submitter may burst.
    #[clap(long, env, default_value = "20")]
    pub order_rate_capacity: u32,

    /// Order submissions per second refilled for each submitter.
    #[clap(long, env, default_value = "20")]
    pub order_rate_refill: f64,

    /// Default log filter; `RUST_LOG` takes precedence.
    #[clap(long, env, default_value = "info")]
    pub log_filter: String,
}

impl Arguments {
    pub fn signing_domain(&self) -> SigningDomain {
        SigningDomain::new(
            &self.venue_name,
            &self.venue_version,
            self.network_id,
            &self.settlement_contract,
        )
    }
}

pub fn parse_match_policy(s: &str) -> Result<MatchPolicy, String> {
    match s {
        "first-fit" => Ok(MatchPolicy::FirstFit),
        "price-time" => Ok(MatchPolicy::PriceTime),
        other => Err(format!(
            "unknown match policy {other:?}, expected first-fit or price-time"
        )),
    }
}

fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            bind_address,
            master_secret: _,
            venue_name,
            venue_version,
            network_id,
            settlement_contract,
            settlement_url,
            settlement_timeout,
            journal_path,
            match_policy,
            expiry_sweep_interval,
            order_rate_capacity,
            order_rate_refill,
            log_filter,
        } = self;

        writeln!(f, "bind_address: {bind_address}")?;
        writeln!(f, "master_secret: SECRET")?;
        writeln!(f, "venue_name: {venue_name}")?;
        writeln!(f, "venue_version: {venue_version}")?;
        writeln!(f, "network_id: {network_id}")?;
        writeln!(f, "settlement_contract: {settlement_contract}")?;
        display_option(f, "settlement_url", settlement_url)?;
        writeln!(f, "settlement_timeout: {settlement_timeout:?}")?;
        display_option(f, "journal_path", &journal_path.as_ref().map(|p| p.display()))?;
        writeln!(f, "match_policy: {match_policy:?}")?;
        writeln!(f, "expiry_sweep_interval: {expiry_sweep_interval:?}")?;
        writeln!(f, "order_rate_capacity: {order_rate_capacity}")?;
        writeln!(f, "order_rate_refill: {order_rate_refill}")?;
        writeln!(f, "log_filter: {log_filter}")?;
        Ok(())
    }
}
