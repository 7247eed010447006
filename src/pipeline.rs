use rayon::prelude::*;

use crate::records::{Field, PropertyRecord, compare_values};
use crate::state::{SessionState, SortDirection};

/// The derived slice of the table: indices into the record source for
/// the current page, plus the totals the pagination strip needs.
#[derive(Debug, Clone, Default)]
pub struct Window {
    pub rows: Vec<usize>,
    pub filtered_count: usize,
    pub total_pages: usize,
}

/// Category filter, then free-text search, then a stable sort, then
/// pagination. Pure: no state is touched, the page is never clamped;
/// a page past the end simply yields an empty window.
pub fn derive(records: &[PropertyRecord], state: &SessionState) -> Window {
    let needle = state.search_text().to_lowercase();
    let filter = state.category_filter();

    let mut rows: Vec<usize> = records
        .par_iter()
        .enumerate()
        .filter(|(_, record)| {
            filter.matches(&record.category)
                && (needle.is_empty() || matches_search(record, &needle))
        })
        .map(|(idx, _)| idx)
        .collect();

    if let Some(key) = state.sort().key {
        let direction = state.sort().direction;
        rows.sort_by(|&a, &b| {
            let ordering = compare_values(records[a].value(key), records[b].value(key));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    let filtered_count = rows.len();
    let total_pages = filtered_count.div_ceil(state.page_size());

    let begin = (state.page() - 1) * state.page_size();
    let end = std::cmp::min(begin + state.page_size(), filtered_count);
    let rows = if begin < end {
        rows[begin..end].to_vec()
    } else {
        Vec::new()
    };

    Window {
        rows,
        filtered_count,
        total_pages,
    }
}

// A record matches when any attribute value, stringified and lowercased,
// contains the needle. Absent values are skipped, not treated as empty.
fn matches_search(record: &PropertyRecord, needle: &str) -> bool {
    Field::ALL.iter().any(|&field| {
        record
            .value(field)
            .is_some_and(|value| value.to_string().to_lowercase().contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CategoryFilter;

    fn record(id: u64, owner: &str, category: &str, amount: u64) -> PropertyRecord {
        PropertyRecord {
            id,
            scheme_name: "Ganga Vihar Yojana".to_string(),
            unique_id: format!("BIDA-GV-{id:04}"),
            owner_name: owner.to_string(),
            father_name: "Test Father".to_string(),
            category: category.to_string(),
            plot_number: format!("A-{id}"),
            registration_amount: amount,
            registration_date: "2024-01-15".to_string(),
            permanent_address: "Ward 3, Hariyanv, Bhadohi".to_string(),
            current_address: "Ward 3, Hariyanv, Bhadohi".to_string(),
            mobile: None,
            allotment_amount: None,
            allotment_date: None,
            sale_price: None,
            lease_rent: None,
            service_charges: None,
        }
    }

    fn ids(records: &[PropertyRecord], window: &Window) -> Vec<u64> {
        window.rows.iter().map(|&idx| records[idx].id).collect()
    }

    #[test]
    fn no_filters_keep_source_order() {
        let records: Vec<_> = (1..=4).map(|i| record(i, "Owner", "MIG", i * 1000)).collect();
        let state = SessionState::new(10);
        let window = derive(&records, &state);
        assert_eq!(ids(&records, &window), vec![1, 2, 3, 4]);
        assert_eq!(window.filtered_count, 4);
        assert_eq!(window.total_pages, 1);
    }

    #[test]
    fn category_filter_is_case_sensitive_exact() {
        let records = vec![
            record(1, "A", "MIG", 1),
            record(2, "B", "mig", 2),
            record(3, "C", "MIG Extended", 3),
        ];
        let mut state = SessionState::new(10);
        state.set_category_filter(CategoryFilter::Only("MIG".into()));
        let window = derive(&records, &state);
        assert_eq!(ids(&records, &window), vec![1]);
    }

    #[test]
    fn search_is_case_insensitive_substring_over_all_fields() {
        let mut records = vec![
            record(1, "Ramesh Kumar", "MIG", 100000),
            record(2, "Sunita Devi", "LIG", 50000),
            record(3, "Anil Yadav", "EWS", 25000),
        ];
        records[2].mobile = Some("9839107788".to_string());

        let mut state = SessionState::new(10);
        state.set_search_text("SUNITA");
        assert_eq!(ids(&records, &derive(&records, &state)), vec![2]);

        // Numbers are searched through their text form.
        state.set_search_text("2500");
        assert_eq!(ids(&records, &derive(&records, &state)), vec![3]);

        // Fields outside the visible registry still match.
        state.set_search_text("983910");
        assert_eq!(ids(&records, &derive(&records, &state)), vec![3]);
    }

    #[test]
    fn search_results_are_a_subset_of_the_category_scope() {
        let records = vec![
            record(1, "Ramesh Kumar", "MIG", 1),
            record(2, "Ramesh Singh", "LIG", 2),
            record(3, "Sunita Devi", "MIG", 3),
        ];
        let mut state = SessionState::new(10);
        state.set_category_filter(CategoryFilter::Only("MIG".into()));
        state.set_search_text("ramesh");
        let window = derive(&records, &state);
        assert_eq!(ids(&records, &window), vec![1]);
    }

    #[test]
    fn whitespace_search_is_not_trimmed() {
        let mut records = vec![record(1, "Ramesh Kumar", "MIG", 1), record(2, "Single", "MIG", 2)];
        // Strip every space out of the second record so " " cannot match it.
        records[1].scheme_name = "GangaViharYojana".into();
        records[1].unique_id = "BIDA0002".into();
        records[1].father_name = "Father".into();
        records[1].plot_number = "A2".into();
        records[1].registration_date = "2024-01-15".into();
        records[1].permanent_address = "Hariyanv".into();
        records[1].current_address = "Hariyanv".into();

        let mut state = SessionState::new(10);
        state.set_search_text(" ");
        assert_eq!(ids(&records, &derive(&records, &state)), vec![1]);
    }

    #[test]
    fn missing_values_never_match_a_search() {
        let records = vec![record(1, "Ramesh", "MIG", 1)];
        let mut state = SessionState::new(10);
        state.set_search_text("98391");
        assert!(derive(&records, &state).rows.is_empty());
    }

    #[test]
    fn sort_is_numeric_for_amount_fields() {
        let records = vec![
            record(1, "A", "MIG", 120000),
            record(2, "B", "MIG", 90000),
            record(3, "C", "MIG", 250000),
        ];
        let mut state = SessionState::new(10);
        state.toggle_sort(Field::RegistrationAmount);
        assert_eq!(ids(&records, &derive(&records, &state)), vec![2, 1, 3]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let records = vec![
            record(4, "Z", "MIG", 1),
            record(2, "Z", "MIG", 2),
            record(9, "A", "MIG", 3),
        ];
        let mut state = SessionState::new(10);
        state.toggle_sort(Field::OwnerName);
        // Equal owner names keep their source order.
        assert_eq!(ids(&records, &derive(&records, &state)), vec![9, 4, 2]);
    }

    #[test]
    fn descending_reverses_the_comparison() {
        let records = vec![
            record(1, "A", "MIG", 1),
            record(2, "B", "MIG", 2),
            record(3, "C", "MIG", 3),
        ];
        let mut state = SessionState::new(10);
        state.toggle_sort(Field::OwnerName);
        state.toggle_sort(Field::OwnerName);
        assert_eq!(ids(&records, &derive(&records, &state)), vec![3, 2, 1]);
    }

    #[test]
    fn absent_sort_keys_group_first_ascending() {
        let mut records = vec![
            record(1, "A", "MIG", 1),
            record(2, "B", "MIG", 2),
            record(3, "C", "MIG", 3),
        ];
        records[1].allotment_amount = Some(5000);

        let mut state = SessionState::new(10);
        state.toggle_sort(Field::AllotmentAmount);
        assert_eq!(ids(&records, &derive(&records, &state)), vec![1, 3, 2]);

        state.toggle_sort(Field::AllotmentAmount);
        assert_eq!(ids(&records, &derive(&records, &state)), vec![2, 1, 3]);
    }

    #[test]
    fn sorting_twice_yields_the_same_window() {
        let records: Vec<_> = (1..=12)
            .map(|i| record(i, "Owner", "MIG", (i * 7) % 13))
            .collect();
        let mut state = SessionState::new(10);
        state.toggle_sort(Field::RegistrationAmount);
        let first = derive(&records, &state);
        let second = derive(&records, &state);
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn pagination_splits_into_ceil_pages() {
        let records: Vec<_> = (1..=25).map(|i| record(i, "Owner", "MIG", i)).collect();
        let mut state = SessionState::new(10);

        let window = derive(&records, &state);
        assert_eq!(window.total_pages, 3);
        assert_eq!(ids(&records, &window), (1..=10).collect::<Vec<u64>>());

        state.set_page(3);
        let window = derive(&records, &state);
        assert_eq!(ids(&records, &window), (21..=25).collect::<Vec<u64>>());
    }

    #[test]
    fn page_past_the_end_yields_an_empty_window() {
        let records: Vec<_> = (1..=25).map(|i| record(i, "Owner", "MIG", i)).collect();
        let mut state = SessionState::new(10);
        state.set_page(4);
        let window = derive(&records, &state);
        assert!(window.rows.is_empty());
        assert_eq!(window.filtered_count, 25);
        assert_eq!(window.total_pages, 3);
    }

    #[test]
    fn zero_matches_mean_zero_pages() {
        let records = vec![record(1, "Ramesh", "MIG", 1)];
        let mut state = SessionState::new(10);
        state.set_search_text("no such text");
        let window = derive(&records, &state);
        assert!(window.rows.is_empty());
        assert_eq!(window.filtered_count, 0);
        assert_eq!(window.total_pages, 0);
    }

    #[test]
    fn empty_source_is_a_valid_state() {
        let state = SessionState::new(10);
        let window = derive(&[], &state);
        assert!(window.rows.is_empty());
        assert_eq!(window.total_pages, 0);
    }

    #[test]
    fn page_size_one_pages_every_record() {
        let records: Vec<_> = (1..=3).map(|i| record(i, "Owner", "MIG", i)).collect();
        let mut state = SessionState::new(1);
        state.set_page(2);
        let window = derive(&records, &state);
        assert_eq!(ids(&records, &window), vec![2]);
        assert_eq!(window.total_pages, 3);
    }
}
