use anyhow::Result;

use crate::config::Config;
use crate::db;

/// Print the top-`k` context blocks for `query`.
///
/// `k` defaults to `[retrieval].top_k`.
pub async fn run_query(config: &Config, query: &str, k: Option<i64>) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let rag = db::open(config)?;
    let k = k.unwrap_or(config.retrieval.top_k);
    let context = rag.topk_text(query, k).await?;

    if context.is_empty() {
        println!("No results.");
    } else {
        println!("{}", context);
    }

    Ok(())
}
