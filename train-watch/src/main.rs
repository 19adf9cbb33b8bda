use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use train_watch::config::AppConfig;
use train_watch::feed::GtfsRtClient;
use train_watch::logging::{self, LOG_RETENTION};
use train_watch::notify::{
    Deduplicator, DeliveryChannel, DeliveryError, JsonRecordStore, NotifyDroidChannel, SystemClock,
    TwilioSmsChannel,
};
use train_watch::run::{Monitor, RunOutcome};
use train_watch::schedule::{GtfsDirectory, ScheduleDownloader, ScheduleQuery};

/// Check one scheduled train departure against the realtime feed.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Route id prefix, e.g. "BMT_1"
    route_prefix: String,
    /// Part of the station's stop name, e.g. "Central Station"
    station_name: String,
    /// Departure time prefix, e.g. "07:56"
    train_time: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_error_status(e.kind()));
        }
    };

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: no .env file loaded: {e}");
    }
    let config = AppConfig::from_env();

    if let Err(e) = logging::init(&config.logs_dir) {
        tracing::warn!(error = %e, "could not open log file, logging to stdout only");
    }
    match logging::prune_old_logs(&config.logs_dir, LOG_RETENTION) {
        Ok(0) => {}
        Ok(n) => tracing::info!(deleted = n, "pruned old log files"),
        Err(e) => tracing::warn!(error = %e, "could not prune old log files"),
    }

    tracing::info!(
        route_prefix = %cli.route_prefix,
        station_name = %cli.station_name,
        train_time = %cli.train_time,
        "arguments"
    );

    if config.api_token.is_none() {
        tracing::warn!("API_TOKEN not set. Feed requests will fail.");
    }

    if config.enable_data_refresh {
        refresh_schedule(&config).await;
    }

    let feed = match GtfsRtClient::new(config.feed_client_config()) {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!(error = %e, "could not create feed client");
            return ExitCode::SUCCESS;
        }
    };

    let channels = match delivery_channels(&config) {
        Ok(channels) => channels,
        Err(e) => {
            tracing::error!(error = %e, "could not create delivery channels");
            return ExitCode::SUCCESS;
        }
    };

    let dedup = Deduplicator::new(JsonRecordStore::new(config.record_path()), SystemClock);
    let schedule = GtfsDirectory::new(&config.gtfs_dir);
    let query = ScheduleQuery::new(cli.route_prefix, cli.station_name, cli.train_time);

    match Monitor::new(&feed, &dedup, &channels)
        .run(&schedule, &query)
        .await
    {
        Ok(RunOutcome::Completed(summary)) => tracing::info!(?summary, "run complete"),
        Ok(outcome) => tracing::info!(?outcome, "run ended early"),
        Err(e) => tracing::error!(error = %e, "could not load schedule"),
    }

    ExitCode::SUCCESS
}

/// Exit status for a command line that did not parse: 0 when help or the
/// version was asked for, 1 for a usage error.
fn parse_error_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Channels in priority order: push before SMS.
fn delivery_channels(config: &AppConfig) -> Result<Vec<Box<dyn DeliveryChannel>>, DeliveryError> {
    let push: Box<dyn DeliveryChannel> =
        Box::new(NotifyDroidChannel::new(config.notifydroid_api_key.clone())?);
    let sms: Box<dyn DeliveryChannel> = Box::new(TwilioSmsChannel::new(config.twilio.clone())?);
    Ok(vec![push, sms])
}

async fn refresh_schedule(config: &AppConfig) {
    let downloader = match ScheduleDownloader::new(config.schedule_download_config()) {
        Ok(downloader) => downloader,
        Err(e) => {
            tracing::error!(error = %e, "could not create schedule downloader");
            return;
        }
    };

    match downloader.refresh().await {
        Ok(Some(path)) => tracing::info!(archive = %path.display(), "schedule refreshed"),
        Ok(None) => {}
        Err(e) => tracing::error!(error = %e, "error downloading the schedule"),
    }
}
