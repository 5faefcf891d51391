mod bands;
mod latest;
mod series;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use river_core::{
    Acquisition, AlignedSeries, DataSource, Envelope, EnvelopeError, EnvelopeMeta, FinmindAdapter,
    FixtureSource, ProviderId, RiverConfig, RiverParams, SeriesAcquirer, StockId, TradingDate,
};
use serde_json::Value;

use crate::cli::{Cli, Command, RiverArgs};
use crate::error::CliError;
use crate::metadata::{elapsed_ms, RequestId};

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source: ProviderId,
}

impl CommandResult {
    pub fn ok(data: Value, source: ProviderId) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

/// Everything a command needs to acquire one security's series.
pub struct Context {
    pub acquirer: SeriesAcquirer,
    pub config: RiverConfig,
    pub as_of: TradingDate,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut config = RiverConfig::from_env()?;
        if let Some(lookback_days) = cli.lookback_days {
            config.lookback_days = lookback_days;
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            config.timeout_ms = timeout_ms;
        }

        let as_of = match &cli.as_of {
            Some(raw) => TradingDate::parse(raw)?,
            None => TradingDate::today_utc(),
        };

        let source: Arc<dyn DataSource> = match &cli.fixture {
            Some(path) => Arc::new(load_fixture(path)?),
            None => Arc::new(FinmindAdapter::from_config(&config)),
        };

        tracing::debug!(?config, %as_of, source = %source.id(), "resolved configuration");

        Ok(Self {
            acquirer: SeriesAcquirer::new(source),
            config,
            as_of,
        })
    }

    /// Rolling parameters with command flags layered over the configuration.
    pub fn river_params(&self, args: &RiverArgs) -> Result<RiverParams, CliError> {
        let defaults = self.config.params;
        RiverParams::new(
            args.window.unwrap_or(defaults.window()),
            args.min_periods.unwrap_or(defaults.min_periods()),
        )
        .map_err(CliError::from)
    }

    pub async fn acquire(&self, stock_id: &StockId) -> Acquired {
        let started = Instant::now();
        let outcome = self
            .acquirer
            .acquire_as_of(stock_id, self.config.lookback_days, self.as_of)
            .await;

        Acquired {
            outcome,
            latency_ms: elapsed_ms(started),
            source: self.acquirer.source_id(),
        }
    }
}

/// An acquisition outcome with its timing.
pub struct Acquired {
    pub outcome: Acquisition,
    pub latency_ms: u64,
    pub source: ProviderId,
}

impl Acquired {
    /// The aligned series, or the finished result to report when there is none.
    ///
    /// No-data becomes a warning over `empty`; a failure becomes an envelope error.
    pub fn into_series(self, stock_id: &StockId, empty: Value) -> Result<AlignedSeries, CommandResult> {
        let result = CommandResult::ok(empty, self.source).with_latency(self.latency_ms);
        match self.outcome {
            Acquisition::Data(series) => Ok(series),
            Acquisition::NoData(reason) => {
                Err(result.with_warning(format!("no data for {stock_id}: {reason}")))
            }
            Acquisition::Failure(failure) => {
                Err(result.with_errors(vec![EnvelopeError::from(&failure)]))
            }
        }
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let context = Context::from_cli(cli)?;

    let command_result = match &cli.command {
        Command::Series(args) => series::run(args, &context).await?,
        Command::Bands(args) => bands::run(args, &context).await?,
        Command::Latest(args) => latest::run(args, &context).await?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source,
    } = command_result;

    let mut meta = EnvelopeMeta::new(RequestId::new_v4().to_string(), source, latency_ms)?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

fn load_fixture(path: &Path) -> Result<FixtureSource, CliError> {
    FixtureSource::from_path(path).map_err(|source| CliError::Fixture {
        path: path.display().to_string(),
        source,
    })
}
