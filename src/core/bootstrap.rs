//! Builds the runtime's collaborators from a [`TraderConfig`].

use std::sync::Arc;
use tracing::{info, warn};

use super::runtime::{RuntimeSettings, TradingRuntime};
use crate::config::{RunMode, TraderConfig};
use crate::db::{BarStore, MemoryBarStore, PostgresBarStore};
use crate::error::{Result, TraderError};
use crate::metrics::Metrics;
use crate::services::kis::{KisClient, KisCredentials, KisOrderExecutor};
use crate::services::{
    DiscordNotifier, LogNotifier, Notifier, OrderExecutor, PaperOrderExecutor, UpstreamFetcher,
};
use crate::session::{Clock, SessionClock};
use crate::signals::SignalEngine;
use crate::sync::GapFiller;

/// Postgres when `DATABASE_URL` is set, otherwise an in-process store.
pub async fn build_store(config: &TraderConfig) -> Result<Arc<dyn BarStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresBarStore::connect(url, config.symbol()).await?;
            info!("Postgres bar store connected");
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, bars are kept in memory only");
            Ok(Arc::new(MemoryBarStore::new()))
        }
    }
}

pub fn build_kis_client(config: &TraderConfig) -> Result<KisClient> {
    let settings = config.kis.as_ref().ok_or_else(|| {
        TraderError::Config("KIS_APP_KEY and KIS_APP_SECRET are required".to_string())
    })?;
    let credentials = KisCredentials {
        app_key: settings.app_key.clone(),
        app_secret: settings.app_secret.clone(),
        access_token: settings.access_token.clone(),
    };
    Ok(match &settings.base_url {
        Some(url) => KisClient::with_base_url(
            url.clone(),
            settings.environment,
            credentials,
            config.exchange_code.clone(),
        ),
        None => KisClient::new(settings.environment, credentials, config.exchange_code.clone()),
    })
}

pub fn build_notifier(config: &TraderConfig) -> Arc<dyn Notifier> {
    match &config.discord_webhook_url {
        Some(url) => Arc::new(DiscordNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    }
}

/// Live mode routes orders to KIS; every other mode only logs them.
pub fn build_executor(config: &TraderConfig, client: &KisClient) -> Result<Arc<dyn OrderExecutor>> {
    if config.run_mode != RunMode::Live {
        return Ok(Arc::new(PaperOrderExecutor::new()));
    }
    let account = config
        .kis
        .as_ref()
        .and_then(|k| k.account.as_deref())
        .ok_or_else(|| TraderError::Config("KIS_ACCOUNT is required in live mode".to_string()))?;
    Ok(Arc::new(KisOrderExecutor::new(
        client.clone(),
        account,
        config.order_exchange_code.clone(),
    )?))
}

pub async fn build_runtime(
    config: &TraderConfig,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
) -> Result<TradingRuntime> {
    let store = build_store(config).await?;
    let client = build_kis_client(config)?;
    let executor = build_executor(config, &client)?;
    let fetcher: Arc<dyn UpstreamFetcher> = Arc::new(client);

    let gap_filler = GapFiller::new(
        config.backfill.clone(),
        store.clone(),
        fetcher,
        clock.clone(),
        SessionClock::new(*config.session()),
    )
    .with_metrics(metrics.clone());

    Ok(TradingRuntime::new(
        RuntimeSettings::from(config),
        store,
        gap_filler,
        SignalEngine::new(config.signals.clone()),
        clock,
        build_notifier(config),
        executor,
        metrics,
    ))
}
