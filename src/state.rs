use std::collections::BTreeSet;

use crate::records::Field;

// Categories always offered by the filter, independent of the loaded data.
pub const CATEGORY_CHOICES: [&str; 5] = ["MIG", "LIG", "Commercial", "Residential", "EWS"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    // Case-sensitive exact match, "All" passes everything.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(value) => value == category,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub key: Option<Field>,
    pub direction: SortDirection,
}

/// Transient per-run state of the table. Nothing in here is persisted.
#[derive(Debug)]
pub struct SessionState {
    search_text: String,
    category_filter: CategoryFilter,
    sort: SortConfig,
    page: usize,
    page_size: usize,
    selected: BTreeSet<u64>,
}

impl SessionState {
    pub fn new(page_size: usize) -> Self {
        SessionState {
            search_text: String::new(),
            category_filter: CategoryFilter::All,
            sort: SortConfig::default(),
            page: 1,
            page_size: page_size.max(1),
            selected: BTreeSet::new(),
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn category_filter(&self) -> &CategoryFilter {
        &self.category_filter
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn selected_ids(&self) -> &BTreeSet<u64> {
        &self.selected
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    // Does not reset the page; an out-of-range page renders empty.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn set_category_filter(&mut self, filter: CategoryFilter) {
        self.category_filter = filter;
    }

    // Same key flips the direction, a new key starts ascending.
    pub fn toggle_sort(&mut self, field: Field) {
        if self.sort.key == Some(field) {
            self.sort.direction = self.sort.direction.flipped();
        } else {
            self.sort = SortConfig {
                key: Some(field),
                direction: SortDirection::Ascending,
            };
        }
    }

    // Pages are 1-based; range clamping is the model's business.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn toggle_row_selection(&mut self, id: u64) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    // On: the selection becomes exactly the given page ids, replacing
    // whatever was selected before. Off: clears the whole selection.
    pub fn set_select_all(&mut self, on: bool, page_ids: &[u64]) {
        if on {
            self.selected = page_ids.iter().copied().collect();
        } else {
            self.selected.clear();
        }
    }

    pub fn clear_filters(&mut self) {
        self.search_text.clear();
        self.category_filter = CategoryFilter::All;
    }
}
