use river_core::StockId;
use serde_json::json;

use crate::cli::SeriesArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

pub async fn run(args: &SeriesArgs, context: &Context) -> Result<CommandResult, CliError> {
    let stock_id = StockId::parse(&args.stock_id)?;
    let acquired = context.acquire(&stock_id).await;
    let (latency_ms, source) = (acquired.latency_ms, acquired.source);

    let empty = json!({ "stock_id": stock_id, "records": [] });
    match acquired.into_series(&stock_id, empty) {
        Ok(series) => {
            let data = serde_json::to_value(&series)?;
            Ok(CommandResult::ok(data, source).with_latency(latency_ms))
        }
        Err(result) => Ok(result),
    }
}
