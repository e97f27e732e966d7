//! The listing pipeline: free-text fuzzy filter, state and score predicates,
//! score sort, and fixed-size pagination over the full vendor collection.
//!
//! The whole thing is a pure function of (collection, query); callers hold no
//! state here and no ordering is persisted.

use super::domain::{Region, Vendor};
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};
use serde::{Deserialize, Serialize};

/// Vendors shown per page, matching the listing grid.
pub const PAGE_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Highest score first.
    #[default]
    High,
    /// Lowest score first.
    Low,
}

/// Filter/sort/page request. The sentinels mirror the UI: empty text,
/// no state, and a zero minimum score each mean "no constraint".
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub text: String,
    pub state: Option<Region>,
    pub min_score: f64,
    pub sort: SortOrder,
    pub page: usize,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            state: None,
            min_score: 0.0,
            sort: SortOrder::High,
            page: 1,
        }
    }
}

impl ListingQuery {
    /// Changing any filter or sort input drops the reader back to page 1;
    /// only an explicit page change keeps the rest of the query.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self.page = 1;
        self
    }

    pub fn with_state(mut self, state: Option<Region>) -> Self {
        self.state = state;
        self.page = 1;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self.page = 1;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// One page of the filtered, sorted collection plus the counts the pager
/// needs. `total` is the filtered size, not the page length.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub vendors: Vec<Vendor>,
    pub total: usize,
    pub total_pages: usize,
    pub page: usize,
}

/// Run the pipeline. Filters are commutative among themselves but the order
/// of the later stages matters: sort after filtering, paginate after sort.
pub fn run(vendors: &[Vendor], query: &ListingQuery) -> ListingPage {
    let mut result: Vec<Vendor> = if query.text.trim().is_empty() {
        vendors.to_vec()
    } else {
        fuzzy_filter(vendors, query.text.trim())
    };

    if let Some(state) = query.state {
        result.retain(|vendor| vendor.state == state);
    }

    if query.min_score > 0.0 {
        result.retain(|vendor| vendor.jason_score >= query.min_score);
    }

    // Vec::sort_by is stable: tied scores keep the pre-sort order, which is
    // collection order without a text query and match rank with one.
    match query.sort {
        SortOrder::High => result.sort_by(|a, b| b.jason_score.total_cmp(&a.jason_score)),
        SortOrder::Low => result.sort_by(|a, b| a.jason_score.total_cmp(&b.jason_score)),
    }

    let total = result.len();
    let total_pages = total.div_ceil(PAGE_SIZE);
    let page = query.page.max(1);
    let start = (page - 1).saturating_mul(PAGE_SIZE);
    let vendors = if start >= total {
        Vec::new()
    } else {
        result[start..(start + PAGE_SIZE).min(total)].to_vec()
    };

    ListingPage {
        vendors,
        total,
        total_pages,
        page,
    }
}

/// Typo-tolerant match against name, address, and keypoints. Survivors are
/// ordered by their best match score, ties by collection order.
fn fuzzy_filter(vendors: &[Vendor], text: &str) -> Vec<Vendor> {
    let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
    let pattern = Pattern::parse(text, CaseMatching::Smart, Normalization::Smart);

    let mut scored: Vec<(usize, u32)> = vendors
        .iter()
        .enumerate()
        .filter_map(|(idx, vendor)| {
            let best = match_targets(vendor)
                .filter_map(|target| {
                    let haystack = Utf32String::from(target);
                    pattern.score(haystack.slice(..), &mut matcher)
                })
                .max()?;
            Some((idx, best))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored
        .into_iter()
        .map(|(idx, _)| vendors[idx].clone())
        .collect()
}

fn match_targets(vendor: &Vendor) -> impl Iterator<Item = &str> {
    [vendor.name.as_str(), vendor.address.as_str()]
        .into_iter()
        .chain(vendor.keypoints.iter().map(String::as_str))
}
