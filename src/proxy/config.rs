//! Proxy configuration: command line with environment fallbacks.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

/// Long-lived caching for relayed recordings; they never change once recorded.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
pub const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";

/// Command-line arguments for calldesk-audio-proxy
#[derive(Parser, Debug, Clone)]
#[command(name = "calldesk-audio-proxy")]
#[command(about = "Same-origin audio relay for the call desk dashboard")]
#[command(version)]
pub struct ProxyArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "CALLDESK_PROXY_BIND")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "8787", env = "CALLDESK_PROXY_PORT")]
    pub port: u16,

    /// Seconds to wait for upstream response headers
    #[arg(long, default_value = "30", env = "CALLDESK_PROXY_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: u64,

    /// Seconds to wait for an upstream connection
    #[arg(long, default_value = "10", env = "CALLDESK_PROXY_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: u64,

    /// Comma-separated upstream hosts to allow (all hosts when empty)
    #[arg(long, value_delimiter = ',', env = "CALLDESK_PROXY_ALLOWED_HOSTS")]
    pub allowed_hosts: Vec<String>,

    /// User-Agent sent upstream
    #[arg(long, env = "CALLDESK_PROXY_USER_AGENT")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProxyConfig {
    pub addr: SocketAddr,
    pub upstream_timeout: Duration,
    pub connect_timeout: Duration,
    /// Lower-cased host names; empty allows every host.
    pub allowed_hosts: Vec<String>,
    pub user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8787),
            upstream_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            allowed_hosts: Vec::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl From<ProxyArgs> for ProxyConfig {
    fn from(args: ProxyArgs) -> Self {
        Self {
            addr: SocketAddr::new(args.bind, args.port),
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs.max(1)),
            connect_timeout: Duration::from_secs(args.connect_timeout_secs.max(1)),
            allowed_hosts: args
                .allowed_hosts
                .into_iter()
                .map(|host| host.trim().to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
            user_agent: args.user_agent.unwrap_or_else(default_user_agent),
        }
    }
}

impl ProxyConfig {
    pub fn allows_host(&self, host: &str) -> bool {
        self.allowed_hosts.is_empty()
            || self
                .allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(host))
    }

    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.clone())
            .build()
    }
}

fn default_user_agent() -> String {
    format!("calldesk-audio-proxy/{}", env!("CARGO_PKG_VERSION"))
}
