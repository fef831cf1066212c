use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub rocksdb_name: &'static str,
    pub point_lookup: bool,
}

impl Column {
    pub const fn new(name: &'static str) -> Self {
        Self { rocksdb_name: name, point_lookup: false }
    }
    pub const fn set_point_lookup(mut self) -> Self {
        self.point_lookup = true;
        self
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rocksdb_name)
    }
}

/// Single-value records: the stored application version and other bookkeeping.
pub const META_COLUMN: Column = Column::new("meta").set_point_lookup();
pub const ACCOUNTS_COLUMN: Column = Column::new("accounts");
pub const SETTINGS_COLUMN: Column = Column::new("settings").set_point_lookup();
pub const CHAIN_INFO_COLUMN: Column = Column::new("chain_info");
pub const ASSETS_COLUMN: Column = Column::new("assets");
pub const BALANCES_COLUMN: Column = Column::new("balances");
pub const NFT_COLLECTIONS_COLUMN: Column = Column::new("nft_collections");
pub const NFTS_COLUMN: Column = Column::new("nfts");
pub const STAKING_COLUMN: Column = Column::new("staking");
pub const TRANSACTIONS_COLUMN: Column = Column::new("transactions");

pub const ALL_COLUMNS: &[Column] = &[
    META_COLUMN,
    ACCOUNTS_COLUMN,
    SETTINGS_COLUMN,
    CHAIN_INFO_COLUMN,
    ASSETS_COLUMN,
    BALANCES_COLUMN,
    NFT_COLLECTIONS_COLUMN,
    NFTS_COLUMN,
    STAKING_COLUMN,
    TRANSACTIONS_COLUMN,
];
