//! Health command handler.

use clap::Args;
use grounded_core::{config::AppConfig, AppError, AppResult};
use grounded_knowledge::HealthStatus;

use super::open_store;

/// Report whether the evidence store is ready
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing health command");

        // A store that was never built is reported, not raised
        let status = match open_store(config) {
            Ok(store) => HealthStatus {
                ready: !store.is_empty(),
                evidence_row_count: store.len(),
            },
            Err(AppError::Config(msg)) => {
                tracing::warn!("{}", msg);
                HealthStatus {
                    ready: false,
                    evidence_row_count: 0,
                }
            }
            Err(e) => return Err(e),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else if status.ready {
            println!("ready ({} evidence rows)", status.evidence_row_count);
        } else {
            println!("not ready");
        }

        Ok(())
    }
}
