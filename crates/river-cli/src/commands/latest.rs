use river_core::{transform, RiverParams, RiverRecord, StockId, TradingDate, ValuationZone};
use serde::Serialize;

use crate::cli::RiverArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct LatestResponseData {
    stock_id: StockId,
    params: RiverParams,
    /// Last aligned date, whether or not its bands are defined.
    last_date: Option<TradingDate>,
    record: Option<RiverRecord>,
    zone: Option<ValuationZone>,
}

pub async fn run(args: &RiverArgs, context: &Context) -> Result<CommandResult, CliError> {
    let stock_id = StockId::parse(&args.stock_id)?;
    let params = context.river_params(args)?;
    let acquired = context.acquire(&stock_id).await;
    let (latency_ms, source) = (acquired.latency_ms, acquired.source);

    let mut data = LatestResponseData {
        stock_id: stock_id.clone(),
        params,
        last_date: None,
        record: None,
        zone: None,
    };

    let series = match acquired.into_series(&stock_id, serde_json::to_value(&data)?) {
        Ok(series) => series,
        Err(result) => return Ok(result),
    };

    let river = transform(&series, params);
    data.last_date = series.last_date();
    data.record = river.latest_defined().copied();
    data.zone = data.record.as_ref().and_then(RiverRecord::zone);

    let mut result =
        CommandResult::ok(serde_json::to_value(&data)?, source).with_latency(latency_ms);
    match &data.record {
        None => {
            result = result.with_warning(format!(
                "{} aligned records are fewer than min_periods {}; bands are undefined",
                river.len(),
                params.min_periods()
            ));
        }
        Some(record) if record.record.eps <= 0.0 => {
            result = result.with_warning(format!(
                "PER on {} is not positive; bands collapse to zero and no zone applies",
                record.record.date
            ));
        }
        Some(_) => {}
    }
    Ok(result)
}
