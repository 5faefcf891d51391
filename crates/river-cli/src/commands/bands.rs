use river_core::{transform, StockId};
use serde_json::json;

use crate::cli::RiverArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

pub async fn run(args: &RiverArgs, context: &Context) -> Result<CommandResult, CliError> {
    let stock_id = StockId::parse(&args.stock_id)?;
    let params = context.river_params(args)?;
    let acquired = context.acquire(&stock_id).await;
    let (latency_ms, source) = (acquired.latency_ms, acquired.source);

    let empty = json!({ "stock_id": stock_id, "params": params, "records": [] });
    let series = match acquired.into_series(&stock_id, empty) {
        Ok(series) => series,
        Err(result) => return Ok(result),
    };

    let river = transform(&series, params);
    let mut result =
        CommandResult::ok(serde_json::to_value(&river)?, source).with_latency(latency_ms);
    if river.defined_count() == 0 {
        result = result.with_warning(format!(
            "{} aligned records are fewer than min_periods {}; bands are undefined",
            river.len(),
            params.min_periods()
        ));
    }
    Ok(result)
}
