pub mod book;
pub mod format;
pub mod sample;
pub mod token;
pub mod transactions;
pub mod view;

pub use book::{RefreshOutcome, SampleTokenSource, TokenBook, TokenSource};
pub use format::{format_change, format_compact_usd, format_price, ChangeDirection, PriceChange};
pub use token::{ensure_unique_ids, SocialLinks, TokenRecord};
pub use transactions::{
    export_csv, export_filename, filter_transactions, Transaction, TransactionKind,
    TransactionStatus,
};
pub use view::{
    derive_visible_list, toggle_hidden, toggle_tracked, update_sort, CategoryFilter, SortField,
    SortOrder, ViewState,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid view parameter: {0}")]
    InvalidViewParameter(String),
    #[error("Invalid token record: {0}")]
    InvalidToken(String),
    #[error("Token refresh failed: {0}")]
    Refresh(String),
    #[error("Export error: {0}")]
    Export(String),
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
