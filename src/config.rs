//! Service configuration.
//!
//! Every setting can be given as a flag or an environment variable; `main` loads `.env`
//! first so local overrides work without exporting anything.

use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::error::InvalidWindow;
use crate::models::TimeWindow;
use crate::scrapers::{rainbet::RAINBET_API_URL, xfun::XFUN_API_URL};
use crate::state::BiweeklySettings;

#[derive(Debug, Clone, Parser)]
#[command(name = "wagerboard", version, about = "Affiliate wager leaderboard service")]
pub struct Config {
    /// Interface to bind the HTTP server on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "RAINBET_API_URL", default_value = RAINBET_API_URL)]
    pub rainbet_api_url: String,

    #[arg(long, env = "RAINBET_API_KEY", hide_env_values = true)]
    pub rainbet_api_key: String,

    #[arg(long, env = "XFUN_API_URL", default_value = XFUN_API_URL)]
    pub xfun_api_url: String,

    /// Affiliate code the paginated API filters on
    #[arg(long, env = "XFUN_CODE")]
    pub xfun_code: String,

    #[arg(long, env = "XFUN_API_KEY", hide_env_values = true)]
    pub xfun_api_key: String,

    /// Start of the biweekly window (RFC 3339)
    #[arg(long, env = "XFUN_WINDOW_START", default_value = "2025-08-11T00:00:00Z")]
    pub xfun_window_start: DateTime<Utc>,

    /// End of the biweekly window (RFC 3339)
    #[arg(long, env = "XFUN_WINDOW_END", default_value = "2025-08-25T00:00:00Z")]
    pub xfun_window_end: DateTime<Utc>,

    #[arg(long, env = "XFUN_PAGE_SIZE", default_value_t = 50)]
    pub xfun_page_size: u32,

    /// Safety ceiling on pages requested per aggregation
    #[arg(long, env = "XFUN_MAX_PAGES", default_value_t = 200)]
    pub xfun_max_pages: u32,

    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 300)]
    pub refresh_interval_secs: u64,

    /// Public URL to ping for keep-alive; disabled when unset
    #[arg(long, env = "SELF_PING_URL")]
    pub self_ping_url: Option<String>,

    #[arg(long, env = "SELF_PING_INTERVAL_SECS", default_value_t = 270)]
    pub self_ping_interval_secs: u64,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn xfun_window(&self) -> Result<TimeWindow, InvalidWindow> {
        TimeWindow::new(self.xfun_window_start, self.xfun_window_end)
    }

    pub fn biweekly(&self) -> Result<BiweeklySettings, InvalidWindow> {
        Ok(BiweeklySettings {
            window: self.xfun_window()?,
            page_size: self.xfun_page_size.max(1),
            max_pages: self.xfun_max_pages,
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn self_ping_interval(&self) -> Duration {
        Duration::from_secs(self.self_ping_interval_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Keep-alive target, ignoring blank values.
    pub fn self_ping_target(&self) -> Option<&str> {
        self.self_ping_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const REQUIRED: [&str; 7] = [
        "wagerboard",
        "--rainbet-api-key",
        "rk",
        "--xfun-code",
        "code",
        "--xfun-api-key",
        "xk",
    ];

    #[test]
    fn test_defaults() {
        let cfg = Config::try_parse_from(REQUIRED).unwrap();
        assert_eq!(cfg.rainbet_api_url, RAINBET_API_URL);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(300));
        assert_eq!(cfg.self_ping_interval(), Duration::from_secs(270));

        let bw = cfg.biweekly().unwrap();
        assert_eq!(bw.window.start(), Utc.with_ymd_and_hms(2025, 8, 11, 0, 0, 0).unwrap());
        assert_eq!(bw.window.end(), Utc.with_ymd_and_hms(2025, 8, 25, 0, 0, 0).unwrap());
        assert_eq!((bw.page_size, bw.max_pages), (50, 200));
    }

    #[test]
    fn test_listen_addr() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.extend(["--bind", "127.0.0.1", "--port", "8080"]);
        let cfg = Config::try_parse_from(args).unwrap();
        assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_keys_rejected() {
        assert!(Config::try_parse_from(["wagerboard", "--xfun-code", "c"]).is_err());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.extend([
            "--xfun-window-start",
            "2025-09-01T00:00:00Z",
            "--xfun-window-end",
            "2025-08-01T00:00:00Z",
        ]);
        let cfg = Config::try_parse_from(args).unwrap();
        assert!(cfg.xfun_window().is_err());
    }

    #[test]
    fn test_blank_ping_url_disables_keepalive() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.extend(["--self-ping-url", "  "]);
        let cfg = Config::try_parse_from(args).unwrap();
        assert_eq!(cfg.self_ping_target(), None);
    }
}
