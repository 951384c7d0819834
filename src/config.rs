//! Environment-driven configuration.
//!
//! `.env` is loaded by the binaries through `dotenvy`; everything here reads
//! plain environment variables and falls back to the defaults of a single
//! US-listed ETF traded on 15-minute buckets.

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use std::env;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::error::{Result, TraderError};
use crate::indicators::{MacdParams, RsiParams};
use crate::series::BucketOrigin;
use crate::services::kis::KisEnvironment;
use crate::session::SessionHours;
use crate::signals::{BandMfiParams, SignalConfig};
use crate::sync::GapFillerConfig;

/// Deployment environment, used to pick the log format.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Orders are routed to the broker.
    Live,
    /// Orders are logged only.
    Paper,
    /// Signals are computed and announced, never ordered.
    Analyze,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Live => "live",
            RunMode::Paper => "paper",
            RunMode::Analyze => "analyze",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" | "1" => Ok(RunMode::Live),
            "paper" | "2" => Ok(RunMode::Paper),
            "analyze" | "analysis" | "3" => Ok(RunMode::Analyze),
            other => Err(TraderError::Config(format!("unknown RUN_MODE {:?}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KisSettings {
    pub environment: KisEnvironment,
    /// Overrides the environment's default base URL.
    pub base_url: Option<String>,
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
    pub account: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TraderConfig {
    pub environment: String,
    pub run_mode: RunMode,
    pub exchange_code: String,
    pub order_exchange_code: String,
    pub backfill: GapFillerConfig,
    pub bucket_minutes: NonZeroU32,
    pub bucket_origin: BucketOrigin,
    /// One-minute bars loaded for each analysis.
    pub raw_limit: usize,
    /// Second of the minute at which the per-minute cycle fires.
    pub trigger_second: u32,
    pub signals: SignalConfig,
    pub database_url: Option<String>,
    pub kis: Option<KisSettings>,
    pub discord_webhook_url: Option<String>,
    pub order_quantity: u32,
    pub http_port: u16,
    /// Trailing buckets printed by the one-shot analysis.
    pub analyze_tail: usize,
}

impl TraderConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and blank keys take their
    /// defaults; malformed values are configuration errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let symbol = vars.string("SYMBOL", "SOXL");
        let backfill = GapFillerConfig {
            symbol,
            resolution_minutes: vars.parse("RESOLUTION_MINUTES", 1)?,
            include_prior_session: vars.flag("INCLUDE_PRIOR_SESSION", true)?,
            max_per_page: vars.parse("MAX_PER_PAGE", 120)?,
            bootstrap_minutes: vars.parse("BOOTSTRAP_MINUTES", 2400)?,
            pacing: StdDuration::from_millis(vars.parse("PACING_MS", 500)?),
            pass_delay: StdDuration::from_millis(vars.parse("PASS_DELAY_MS", 1000)?),
        };
        if backfill.max_per_page == 0 {
            return Err(TraderError::Config("MAX_PER_PAGE must be positive".to_string()));
        }

        let bucket_minutes = NonZeroU32::new(vars.parse("BUCKET_MINUTES", 15)?)
            .ok_or_else(|| TraderError::Config("BUCKET_MINUTES must be positive".to_string()))?;
        let bucket_origin = match vars.get("BUCKET_ORIGIN").as_deref() {
            None | Some("clock") => BucketOrigin::Clock,
            Some("first-bar") | Some("first_bar") => BucketOrigin::FirstBar,
            Some(other) => {
                return Err(TraderError::Config(format!("unknown BUCKET_ORIGIN {:?}", other)))
            }
        };

        let timezone: Tz = vars
            .string("SESSION_TZ", "America/New_York")
            .parse()
            .map_err(|e| TraderError::Config(format!("invalid SESSION_TZ: {}", e)))?;
        let session = SessionHours {
            timezone,
            open: vars.time("SESSION_OPEN", "09:30")?,
            close: vars.time("SESSION_CLOSE", "16:00")?,
            preopen_lead: Duration::minutes(vars.parse("PREOPEN_LEAD_MINUTES", 10)?),
            exit_cutoff: vars.time("EXIT_CUTOFF", "15:50")?,
        };
        if session.open >= session.close {
            return Err(TraderError::Config("SESSION_OPEN must precede SESSION_CLOSE".to_string()));
        }

        let macd = if vars.flag("MACD_ENABLED", true)? {
            Some(MacdParams {
                fast_span: vars.parse("MACD_FAST", 12)?,
                slow_span: vars.parse("MACD_SLOW", 26)?,
                signal_span: vars.parse("MACD_SIGNAL", 3)?,
            })
        } else {
            None
        };
        let rsi = if vars.flag("RSI_ENABLED", false)? {
            Some(RsiParams {
                window: vars.parse("RSI_WINDOW", 14)?,
                oversold: vars.parse("RSI_OVERSOLD", 20.0)?,
                overbought: vars.parse("RSI_OVERBOUGHT", 80.0)?,
            })
        } else {
            None
        };
        let band_mfi = if vars.flag("BAND_MFI_ENABLED", false)? {
            let defaults = BandMfiParams::default();
            Some(BandMfiParams {
                band_window: vars.parse("BAND_WINDOW", defaults.band_window)?,
                band_k: vars.parse("BAND_K", defaults.band_k)?,
                mfi_window: vars.parse("MFI_WINDOW", defaults.mfi_window)?,
                ..defaults
            })
        } else {
            None
        };
        let signals = SignalConfig::default()
            .with_macd(macd)
            .with_rsi(rsi)
            .with_band_mfi(band_mfi)
            .with_session(session);

        let kis = match (vars.get("KIS_APP_KEY"), vars.get("KIS_APP_SECRET")) {
            (Some(app_key), Some(app_secret)) => Some(KisSettings {
                environment: match vars.get("KIS_ENVIRONMENT").as_deref() {
                    None | Some("virtual") | Some("paper") => KisEnvironment::Virtual,
                    Some("production") | Some("prod") => KisEnvironment::Production,
                    Some(other) => {
                        return Err(TraderError::Config(format!("unknown KIS_ENVIRONMENT {:?}", other)))
                    }
                },
                base_url: vars.get("KIS_BASE_URL"),
                app_key,
                app_secret,
                access_token: vars.string("KIS_ACCESS_TOKEN", ""),
                account: vars.get("KIS_ACCOUNT"),
            }),
            _ => None,
        };

        Ok(Self {
            environment: vars.string("ENVIRONMENT", "sandbox"),
            run_mode: vars.string("RUN_MODE", "analyze").parse()?,
            exchange_code: vars.string("EXCHANGE_CODE", "AMS"),
            order_exchange_code: vars.string("ORDER_EXCHANGE_CODE", "AMEX"),
            backfill,
            bucket_minutes,
            bucket_origin,
            raw_limit: vars.parse("RAW_LIMIT", 2400)?,
            trigger_second: vars.parse("TRIGGER_SECOND", 3)?,
            signals,
            database_url: vars.get("DATABASE_URL"),
            kis,
            discord_webhook_url: vars.get("DISCORD_WEBHOOK_URL"),
            order_quantity: vars.parse("ORDER_QUANTITY", 1)?,
            http_port: vars.parse("HTTP_PORT", 8080)?,
            analyze_tail: vars.parse("ANALYZE_TAIL", 20)?,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.backfill.symbol
    }

    pub fn session(&self) -> &SessionHours {
        &self.signals.session
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e| TraderError::Config(format!("invalid {}={:?}: {}", key, raw, e))),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key).map(|v| v.to_ascii_lowercase()).as_deref() {
            None => Ok(default),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some("0" | "false" | "no" | "off") => Ok(false),
            Some(other) => Err(TraderError::Config(format!("invalid {}={:?}", key, other))),
        }
    }

    fn time(&self, key: &str, default: &str) -> Result<NaiveTime> {
        let raw = self.string(key, default);
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|e| TraderError::Config(format!("invalid {}={:?}: {}", key, raw, e)))
    }
}
