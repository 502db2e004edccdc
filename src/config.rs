use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Parser, Debug)]
#[command(author, version, about = "Look up R-TECH apartment prices by street address")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve GET /crawl?address=... over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "RTECH_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
    /// Look up one address and print the result as JSON
    Crawl {
        /// Street address, e.g. "서울특별시 강남구 테헤란로 152"
        address: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BrowserArgs {
    /// Show the browser window instead of running headless
    #[arg(long, global = true, env = "RTECH_HEADFUL")]
    pub headful: bool,

    /// Proxy server for Chrome, e.g. "http://127.0.0.1:3128"
    #[arg(long, global = true, env = "RTECH_PROXY")]
    pub proxy: Option<String>,

    #[arg(long, global = true, env = "RTECH_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Seconds to wait for page elements
    #[arg(long, global = true, env = "RTECH_ELEMENT_TIMEOUT", default_value_t = 10)]
    pub element_timeout: u64,

    /// Seconds to wait for the price table in the popup
    #[arg(long, global = true, env = "RTECH_TABLE_TIMEOUT", default_value_t = 20)]
    pub table_timeout: u64,

    /// Seconds to wait for the price popup tab to open
    #[arg(long, global = true, env = "RTECH_POPUP_TIMEOUT", default_value_t = 10)]
    pub popup_timeout: u64,

    /// Milliseconds to let quick search fill its dropdown
    #[arg(long, global = true, default_value_t = 3000)]
    pub quick_search_delay_ms: u64,

    /// Milliseconds to let the map info window open
    #[arg(long, global = true, default_value_t = 1000)]
    pub info_window_delay_ms: u64,
}

impl BrowserArgs {
    pub fn into_config(self) -> BrowserConfig {
        BrowserConfig {
            headless: !self.headful,
            proxy: self.proxy.filter(|p| !p.trim().is_empty()),
            user_agent: self.user_agent,
            element_timeout: Duration::from_secs(self.element_timeout),
            table_timeout: Duration::from_secs(self.table_timeout),
            popup_timeout: Duration::from_secs(self.popup_timeout),
            quick_search_delay: Duration::from_millis(self.quick_search_delay_ms),
            info_window_delay: Duration::from_millis(self.info_window_delay_ms),
            ..BrowserConfig::default()
        }
    }
}

/// Settings for one headless Chrome lookup session
#[derive(Debug, Clone, Serialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub proxy: Option<String>,
    pub user_agent: String,
    pub element_timeout: Duration,
    pub table_timeout: Duration,
    pub popup_timeout: Duration,
    pub quick_search_delay: Duration,
    pub info_window_delay: Duration,
    /// Chrome is killed after being idle this long
    pub session_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            element_timeout: Duration::from_secs(10),
            table_timeout: Duration::from_secs(20),
            popup_timeout: Duration::from_secs(10),
            quick_search_delay: Duration::from_secs(3),
            info_window_delay: Duration::from_secs(1),
            session_timeout: Duration::from_secs(90),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["rtech-price-scout", "serve"]).unwrap();

        match cli.command {
            Command::Serve { bind } => assert_eq!(bind.port(), 8000),
            other => panic!("unexpected command: {:?}", other),
        }

        let config = cli.browser.into_config();
        assert!(config.headless);
        assert_eq!(config.proxy, None);
        assert_eq!(config.table_timeout, Duration::from_secs(20));
        assert_eq!(config.quick_search_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_crawl_with_browser_flags() {
        let cli = Cli::try_parse_from([
            "rtech-price-scout",
            "crawl",
            "서울특별시 송파구 올림픽로 300",
            "--headful",
            "--proxy",
            "http://127.0.0.1:3128",
            "--table-timeout",
            "5",
        ])
        .unwrap();

        match &cli.command {
            Command::Crawl { address } => assert_eq!(address, "서울특별시 송파구 올림픽로 300"),
            other => panic!("unexpected command: {:?}", other),
        }

        let config = cli.browser.into_config();
        assert!(!config.headless);
        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:3128"));
        assert_eq!(config.table_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_logs_as_json() {
        let config = BrowserConfig {
            proxy: Some("socks5://10.0.0.2:1080".to_string()),
            ..BrowserConfig::default()
        };
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["headless"], true);
        assert_eq!(value["proxy"], "socks5://10.0.0.2:1080");
        assert_eq!(value["table_timeout"]["secs"], 20);
    }

    #[test]
    fn test_blank_proxy_is_ignored() {
        let cli =
            Cli::try_parse_from(["rtech-price-scout", "--proxy", " ", "crawl", "주소"]).unwrap();
        assert_eq!(cli.browser.into_config().proxy, None);
    }
}
