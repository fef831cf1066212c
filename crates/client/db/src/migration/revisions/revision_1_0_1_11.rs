//! 1.0.1-11: the NFT cache is refetched with the new metadata layout.

use crate::migration::{MigrationContext, MigrationJob, MigrationProgress};
use crate::{NFTS_COLUMN, NFT_COLLECTIONS_COLUMN};
use anyhow::Context;

#[derive(Debug)]
pub struct ClearNftCache {
    ctx: MigrationContext,
}

impl ClearNftCache {
    pub fn new(ctx: MigrationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl MigrationJob for ClearNftCache {
    async fn run(&mut self) -> anyhow::Result<()> {
        let columns = [NFTS_COLUMN, NFT_COLLECTIONS_COLUMN];
        for (i, column) in columns.into_iter().enumerate() {
            let removed = self.ctx.clear_column(column).with_context(|| format!("Clearing the {column} cache"))?;
            self.ctx.report_progress(MigrationProgress::new(i + 1, columns.len(), format!("cleared {removed} {column}")));
        }
        Ok(())
    }
}
