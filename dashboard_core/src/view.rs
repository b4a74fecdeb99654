use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::token::TokenRecord;
use crate::{DashboardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Price,
    MarketCap,
    PriceChange24h,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    All,
    Tracked,
    Untracked,
}

/// User-controlled parameters deciding which tokens are listed and in what order.
///
/// Owned by the presentation layer and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub search_text: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub category_filter: CategoryFilter,
    pub show_hidden: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            sort_field: SortField::MarketCap,
            sort_order: SortOrder::Descending,
            category_filter: CategoryFilter::All,
            show_hidden: false,
        }
    }
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl SortField {
    /// Compare two tokens on this column only
    pub fn compare(self, a: &TokenRecord, b: &TokenRecord) -> Ordering {
        match self {
            SortField::Name => compare_names(&a.name, &b.name),
            SortField::Price => a.price.cmp(&b.price),
            SortField::MarketCap => a.market_cap.cmp(&b.market_cap),
            SortField::PriceChange24h => a.price_change_24h.cmp(&b.price_change_24h),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::MarketCap => "marketCap",
            SortField::PriceChange24h => "priceChange24h",
        }
    }
}

/// Case-insensitive name order; names differing only in case fall back to byte order
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "marketcap" | "market_cap" => Ok(SortField::MarketCap),
            "pricechange24h" | "price_change_24h" => Ok(SortField::PriceChange24h),
            _ => Err(DashboardError::InvalidViewParameter(format!(
                "unknown sort field: '{}'",
                s
            ))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(DashboardError::InvalidViewParameter(format!(
                "unknown sort order: '{}'",
                s
            ))),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(CategoryFilter::All),
            "tracked" => Ok(CategoryFilter::Tracked),
            "untracked" => Ok(CategoryFilter::Untracked),
            _ => Err(DashboardError::InvalidViewParameter(format!(
                "unknown category filter: '{}'",
                s
            ))),
        }
    }
}

impl ViewState {
    /// Build the initial view from configured defaults
    pub fn from_config(config: &config_manager::TokenViewConfig) -> Result<Self> {
        Ok(Self {
            search_text: String::new(),
            sort_field: config.default_sort_field.parse()?,
            sort_order: config.default_sort_order.parse()?,
            category_filter: config.default_category.parse()?,
            show_hidden: config.show_hidden_by_default,
        })
    }

    pub fn is_visible(&self, token: &TokenRecord) -> bool {
        !token.is_hidden || self.show_hidden
    }

    pub fn matches_search(&self, token: &TokenRecord) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        token.name.to_lowercase().contains(&needle)
            || token.symbol.to_lowercase().contains(&needle)
    }

    pub fn matches_category(&self, token: &TokenRecord) -> bool {
        match self.category_filter {
            CategoryFilter::All => true,
            CategoryFilter::Tracked => token.is_tracked,
            CategoryFilter::Untracked => !token.is_tracked,
        }
    }
}

/// Derive the ordered list of tokens to render.
///
/// Filters on visibility, search text and category, then sorts on the view's
/// column. The sort is stable: tokens with equal keys keep their input order in
/// both directions.
pub fn derive_visible_list<'a>(tokens: &'a [TokenRecord], view: &ViewState) -> Vec<&'a TokenRecord> {
    let mut visible: Vec<&TokenRecord> = tokens
        .iter()
        .filter(|token| view.is_visible(token))
        .filter(|token| view.matches_search(token))
        .filter(|token| view.matches_category(token))
        .collect();

    visible.sort_by(|a, b| view.sort_order.apply(view.sort_field.compare(a, b)));

    debug!(
        "Derived {} of {} tokens (search='{}', sort={} {:?}, filter={:?}, show_hidden={})",
        visible.len(),
        tokens.len(),
        view.search_text,
        view.sort_field,
        view.sort_order,
        view.category_filter,
        view.show_hidden
    );

    visible
}

fn toggle_flag(
    tokens: &[TokenRecord],
    id: &str,
    flag: impl Fn(&mut TokenRecord) -> &mut bool,
) -> Vec<TokenRecord> {
    tokens
        .iter()
        .map(|token| {
            let mut token = token.clone();
            if token.id == id {
                let value = flag(&mut token);
                *value = !*value;
            }
            token
        })
        .collect()
}

/// Flip `is_tracked` on the token with `id`; unknown ids leave the collection unchanged
pub fn toggle_tracked(tokens: &[TokenRecord], id: &str) -> Vec<TokenRecord> {
    toggle_flag(tokens, id, |token| &mut token.is_tracked)
}

/// Flip `is_hidden` on the token with `id`; unknown ids leave the collection unchanged
pub fn toggle_hidden(tokens: &[TokenRecord], id: &str) -> Vec<TokenRecord> {
    toggle_flag(tokens, id, |token| &mut token.is_hidden)
}

/// Clicking the active column flips direction; a new column starts descending
pub fn update_sort(view: &ViewState, field: SortField) -> ViewState {
    let mut next = view.clone();
    if view.sort_field == field {
        next.sort_order = view.sort_order.flipped();
    } else {
        next.sort_field = field;
        next.sort_order = SortOrder::Descending;
    }
    next
}
