//! 1.0.1-20: staking positions reference their chain by slug.

use crate::migration::{MigrationContext, MigrationJob, MigrationProgress};
use crate::STAKING_COLUMN;
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StakingItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chain: Option<serde_json::Value>,
    #[serde(rename = "chainSlug", default, skip_serializing_if = "Option::is_none")]
    chain_slug: Option<serde_json::Value>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl StakingItem {
    /// Returns whether the item changed.
    fn rename_chain(&mut self) -> bool {
        let Some(chain) = self.chain.take() else {
            return false;
        };
        if self.chain_slug.is_none() {
            self.chain_slug = Some(chain);
        }
        true
    }
}

#[derive(Debug)]
pub struct RenameStakingChainField {
    ctx: MigrationContext,
}

impl RenameStakingChainField {
    pub fn new(ctx: MigrationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl MigrationJob for RenameStakingChainField {
    async fn run(&mut self) -> anyhow::Result<()> {
        let items: Vec<(String, StakingItem)> =
            self.ctx.json_entries(STAKING_COLUMN).context("Reading staking positions")?;
        let total = items.len();

        let mut updated = 0;
        for (key, mut item) in items {
            if item.rename_chain() {
                self.ctx.put_json(STAKING_COLUMN, &key, &item).with_context(|| format!("Updating staking position {key}"))?;
                updated += 1;
            }
        }
        self.ctx.report_progress(MigrationProgress::new(total, total, format!("renamed chain field in {updated} staking positions")));
        Ok(())
    }
}
