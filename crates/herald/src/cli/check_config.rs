//! Configuration check command handler.

use herald::{HeraldConfig, HeraldResult, JsonError};

/// Load the configuration and print it with the Discord token masked.
pub fn check_config() -> HeraldResult<()> {
    let config = HeraldConfig::load()?;
    let rendered = serde_json::to_string_pretty(&config.redacted()).map_err(JsonError::from)?;
    println!("{rendered}");
    Ok(())
}
