use super::{AppContext, print_json};
use crate::display::stats_table;
use crate::error::Result;

pub async fn cmd_stats(ctx: &AppContext, json: bool) -> Result<()> {
    let stats = ctx.service.stats().await?;
    if json {
        return print_json(&stats);
    }
    println!("{}", stats_table(&stats));
    Ok(())
}
