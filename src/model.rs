use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace, warn};

use crate::columns::{ColumnId, ColumnRegistry};
use crate::domain::{HELP_TEXT, Message, Mode, PVConfig};
use crate::export::{self, PrintSurface, SpoolPrinter};
use crate::inputter::{InputResult, Inputter};
use crate::pipeline::{Window, derive};
use crate::records::{Field, PropertyRecord, RecordSource};
use crate::state::{CATEGORY_CHOICES, CategoryFilter, SessionState};

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

/// One table row as the ui renders it: checkbox cell first, then the
/// visible data cells.
#[derive(Debug, Clone, PartialEq)]
pub struct UiRow {
    pub id: u64,
    pub selected: bool,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DetailData {
    pub title: String,
    pub rows: Vec<(String, String)>,
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PickerData {
    pub title: String,
    pub items: Vec<String>,
    pub selected: usize,
}

/// Everything the ui needs for one frame. Rebuilt after every message,
/// so the render pass never touches the model itself.
#[derive(Debug, Clone)]
pub struct UiData {
    pub title: String,
    pub mode: Mode,
    pub filter_line: String,
    pub header: Vec<String>,
    pub rows: Vec<UiRow>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub pagination: String,
    pub results_line: String,
    pub status_message: String,
    pub popup_message: String,
    pub detail: DetailData,
    pub picker: PickerData,
    pub input: InputResult,
    pub input_active: bool,
}

impl UiData {
    pub fn empty() -> Self {
        UiData {
            title: String::new(),
            mode: Mode::Table,
            filter_line: String::new(),
            header: Vec::new(),
            rows: Vec::new(),
            selected_row: 0,
            selected_column: 0,
            pagination: String::new(),
            results_line: String::new(),
            status_message: String::new(),
            popup_message: String::new(),
            detail: DetailData::default(),
            picker: PickerData::default(),
            input: InputResult::default(),
            input_active: false,
        }
    }
}

/// Owns the records, the session state and everything derived from them.
pub struct Model {
    name: String,
    config: PVConfig,
    pub status: Status,
    mode: Mode,
    previous_mode: Mode,
    source: RecordSource,
    registry: ColumnRegistry,
    state: SessionState,
    window: Window,
    // curser_column indexes the visible data columns, the checkbox
    // column is not reachable.
    curser_row: usize,
    curser_column: usize,
    select_all: bool,
    detail_row: usize,
    detail_offset: usize,
    picker_curser: usize,
    category_entries: Vec<(CategoryFilter, usize)>,
    input: Inputter,
    last_input: InputResult,
    clipboard: Option<Clipboard>,
    printer: Box<dyn PrintSurface>,
    status_message: String,
    uidata: UiData,
}

impl Model {
    pub fn init(name: impl Into<String>, source: RecordSource, config: &PVConfig) -> Self {
        let mut model = Model {
            name: name.into(),
            config: config.clone(),
            status: Status::Ready,
            mode: Mode::Table,
            previous_mode: Mode::Table,
            source,
            registry: ColumnRegistry::standard(),
            state: SessionState::new(config.page_size),
            window: Window::default(),
            curser_row: 0,
            curser_column: 0,
            select_all: false,
            detail_row: 0,
            detail_offset: 0,
            picker_curser: 0,
            category_entries: Vec::new(),
            input: Inputter::default(),
            last_input: InputResult::default(),
            clipboard: Clipboard::new().ok(),
            printer: Box::new(SpoolPrinter::default()),
            status_message: String::new(),
            uidata: UiData::empty(),
        };
        model.set_status(format!("Loaded {} records", model.source.len()));
        model.refresh();
        info!("Model ready with {} records", model.source.len());
        model
    }

    pub fn uidata(&self) -> &UiData {
        &self.uidata
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn source(&self) -> &RecordSource {
        &self.source
    }

    /// While the search prompt is open the controller forwards key
    /// events unmapped.
    pub fn raw_keyevents(&self) -> bool {
        self.mode == Mode::Input
    }

    pub fn quit(&mut self) {
        info!("Quitting");
        self.status = Status::Quitting;
    }

    pub fn set_print_surface(&mut self, surface: Box<dyn PrintSurface>) {
        self.printer = surface;
    }

    /// Dispatch a message according to the current mode, then rebuild
    /// the derived window and ui data.
    pub fn update(&mut self, message: Message) {
        trace!("Update: mode {:?}, message {:?}", self.mode, message);
        match self.mode {
            Mode::Table => match message {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::Search => self.open_search(),
                Message::Categories => self.open_categories(),
                Message::Columns => self.open_columns(),
                Message::MoveUp => self.move_curser_up(),
                Message::MoveDown => self.move_curser_down(),
                Message::MoveLeft => self.move_curser_left(),
                Message::MoveRight => self.move_curser_right(),
                Message::NextPage => self.set_page(self.state.page() + 1),
                Message::PrevPage => self.set_page(self.state.page().saturating_sub(1).max(1)),
                Message::FirstPage => self.set_page(1),
                Message::LastPage => self.set_page(self.window.total_pages.max(1)),
                Message::GotoPage(page) => self.set_page(page),
                Message::ToggleSelection => self.toggle_selection(),
                Message::ToggleSelectAll => self.toggle_select_all(),
                Message::Sort => self.sort_curser_column(),
                Message::ExportCsv => self.export_page(),
                Message::Print => self.print_page(),
                Message::CopyRow => self.copy_curser_row(),
                Message::CopyCell => self.copy_curser_cell(),
                Message::Enter => self.open_detail(),
                Message::Exit => self.clear_filters(),
                Message::RawKey(_) => (),
            },
            Mode::Detail => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.scroll_detail_up(),
                Message::MoveDown => self.scroll_detail_down(),
                Message::MoveLeft => self.previous_record(),
                Message::MoveRight => self.next_record(),
                Message::CopyRow => self.copy_detail_row(),
                Message::CopyCell => self.copy_detail_cell(),
                Message::Help => self.show_help(),
                Message::Enter | Message::Exit => self.close_overlay(),
                _ => (),
            },
            Mode::Categories => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_picker_up(),
                Message::MoveDown => self.move_picker_down(),
                Message::Enter => self.apply_picked_category(),
                Message::Exit => self.close_overlay(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Mode::Columns => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_picker_up(),
                Message::MoveDown => self.move_picker_down(),
                Message::Enter | Message::ToggleSelection => self.toggle_picked_column(),
                Message::Exit => self.close_overlay(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Mode::Popup => match message {
                Message::Quit => self.quit(),
                Message::Enter | Message::Exit | Message::Help => self.close_overlay(),
                _ => (),
            },
            Mode::Input => {
                if let Message::RawKey(key) = message {
                    self.handle_input(key);
                }
            }
        }
        self.refresh();
    }

    // ---- Control handling functions ----

    /// Re-derive the window from the session state and clamp the
    /// cursers back into range before the ui data is rebuilt.
    fn refresh(&mut self) {
        self.window = derive(self.source.records(), &self.state);
        let nrows = self.window.rows.len();
        self.curser_row = self.curser_row.min(nrows.saturating_sub(1));
        self.detail_row = self.detail_row.min(nrows.saturating_sub(1));
        let ncols = self.registry.visible_data().count();
        self.curser_column = self.curser_column.min(ncols.saturating_sub(1));
        self.uidata = self.build_uidata();
    }

    fn move_curser_up(&mut self) {
        self.curser_row = self.curser_row.saturating_sub(1);
    }

    fn move_curser_down(&mut self) {
        if self.curser_row + 1 < self.window.rows.len() {
            self.curser_row += 1;
        }
    }

    fn move_curser_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
    }

    fn move_curser_right(&mut self) {
        let ncols = self.registry.visible_data().count();
        if self.curser_column + 1 < ncols {
            self.curser_column += 1;
        }
    }

    fn set_page(&mut self, requested: usize) {
        if self.window.total_pages == 0 {
            trace!("Ignoring page change, nothing to page through");
            return;
        }
        let target = requested.clamp(1, self.window.total_pages);
        if target != self.state.page() {
            self.state.set_page(target);
            self.curser_row = 0;
        }
    }

    fn toggle_selection(&mut self) {
        let Some(&idx) = self.window.rows.get(self.curser_row) else {
            self.set_status("No record under the curser");
            return;
        };
        let id = self.source.get(idx).id;
        self.state.toggle_row_selection(id);
    }

    // The flag drives the outcome, not the current selection: switching
    // it on replaces the selection with the page, switching it off
    // clears everything, even rows picked by hand before.
    fn toggle_select_all(&mut self) {
        self.select_all = !self.select_all;
        let ids = self.page_ids();
        self.state.set_select_all(self.select_all, &ids);
        if self.select_all {
            self.set_status(format!("Selected {} rows on this page", ids.len()));
        } else {
            self.set_status("Selection cleared");
        }
    }

    fn page_ids(&self) -> Vec<u64> {
        self.window
            .rows
            .iter()
            .map(|&idx| self.source.get(idx).id)
            .collect()
    }

    fn sort_curser_column(&mut self) {
        let column = self
            .registry
            .visible_data()
            .nth(self.curser_column)
            .map(|(field, column)| (field, column.label, column.sortable));
        match column {
            Some((field, label, true)) => {
                self.state.toggle_sort(field);
                let sort = self.state.sort();
                self.set_status(format!("Sorted by {} ({})", label, sort.direction.label()));
            }
            Some((_, label, false)) => {
                self.set_status(format!("\"{label}\" is not sortable"));
            }
            None => self.set_status("No column under the curser"),
        }
    }

    fn open_search(&mut self) {
        trace!("Opening the search prompt");
        self.mode = Mode::Input;
        self.input.clear();
        self.input.set(self.state.search_text());
        self.last_input = self.input.get();
    }

    fn handle_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if !self.last_input.finished {
            return;
        }
        self.mode = Mode::Table;
        if self.last_input.canceled {
            self.set_status("Search unchanged");
            return;
        }
        let text = self.last_input.input.clone();
        self.state.set_search_text(text.clone());
        self.window = derive(self.source.records(), &self.state);
        if text.is_empty() {
            self.set_status("Search cleared");
        } else {
            self.set_status(format!(
                "Search \"{text}\": {} matches",
                self.window.filtered_count
            ));
        }
    }

    fn open_categories(&mut self) {
        let counts = self.source.category_counts();
        let mut entries: Vec<(CategoryFilter, usize)> =
            vec![(CategoryFilter::All, self.source.len())];
        for (value, count) in &counts {
            entries.push((CategoryFilter::Only(value.clone()), *count));
        }
        // Known categories missing from the data are still offered.
        for choice in CATEGORY_CHOICES {
            if !counts.iter().any(|(value, _)| value == choice) {
                entries.push((CategoryFilter::Only(choice.to_string()), 0));
            }
        }
        self.picker_curser = entries
            .iter()
            .position(|(filter, _)| filter == self.state.category_filter())
            .unwrap_or(0);
        self.category_entries = entries;
        self.mode = Mode::Categories;
    }

    fn apply_picked_category(&mut self) {
        let Some((filter, count)) = self.category_entries.get(self.picker_curser).cloned() else {
            return;
        };
        let message = if filter.is_all() {
            "Showing all categories".to_string()
        } else {
            format!("Category filter: {} ({count} records)", filter.label())
        };
        self.state.set_category_filter(filter);
        self.mode = Mode::Table;
        self.set_status(message);
    }

    fn open_columns(&mut self) {
        self.picker_curser = 0;
        self.mode = Mode::Columns;
    }

    fn toggle_picked_column(&mut self) {
        let column = self
            .registry
            .data_columns()
            .nth(self.picker_curser)
            .map(|(field, column)| (field, column.label, column.visible));
        let Some((field, label, was_visible)) = column else {
            return;
        };
        self.registry.toggle_visibility(ColumnId::Data(field));
        if was_visible {
            self.set_status(format!("Hid \"{label}\""));
        } else {
            self.set_status(format!("Showing \"{label}\""));
        }
    }

    fn move_picker_up(&mut self) {
        self.picker_curser = self.picker_curser.saturating_sub(1);
    }

    fn move_picker_down(&mut self) {
        let len = match self.mode {
            Mode::Categories => self.category_entries.len(),
            _ => self.registry.data_columns().count(),
        };
        if self.picker_curser + 1 < len {
            self.picker_curser += 1;
        }
    }

    fn open_detail(&mut self) {
        if self.window.rows.get(self.curser_row).is_none() {
            self.set_status("No record under the curser");
            return;
        }
        self.detail_row = self.curser_row;
        self.detail_offset = 0;
        self.mode = Mode::Detail;
    }

    fn next_record(&mut self) {
        if self.detail_row + 1 < self.window.rows.len() {
            self.detail_row += 1;
        } else if self.state.page() < self.window.total_pages {
            self.state.set_page(self.state.page() + 1);
            self.window = derive(self.source.records(), &self.state);
            self.detail_row = 0;
        } else {
            self.set_status("Already at the last record");
        }
    }

    fn previous_record(&mut self) {
        if self.detail_row > 0 {
            self.detail_row -= 1;
        } else if self.state.page() > 1 {
            self.state.set_page(self.state.page() - 1);
            self.window = derive(self.source.records(), &self.state);
            self.detail_row = self.window.rows.len().saturating_sub(1);
        } else {
            self.set_status("Already at the first record");
        }
    }

    fn scroll_detail_up(&mut self) {
        self.detail_offset = self.detail_offset.saturating_sub(1);
    }

    fn scroll_detail_down(&mut self) {
        if self.detail_offset + 1 < Field::ALL.len() {
            self.detail_offset += 1;
        }
    }

    fn show_help(&mut self) {
        self.previous_mode = self.mode;
        self.mode = Mode::Popup;
    }

    fn close_overlay(&mut self) {
        self.mode = match self.mode {
            Mode::Popup => self.previous_mode,
            _ => Mode::Table,
        };
    }

    fn clear_filters(&mut self) {
        if self.state.search_text().is_empty() && self.state.category_filter().is_all() {
            return;
        }
        self.state.clear_filters();
        self.set_status("Cleared search and category filter");
    }

    fn clip(&mut self, content: String, what: &str) {
        let outcome = match self.clipboard.as_mut() {
            None => "Clipboard unavailable".to_string(),
            Some(clipboard) => match clipboard.set_text(content) {
                Ok(_) => format!("Copied {what} to clipboard"),
                Err(e) => format!("Clipboard error: {e:?}"),
            },
        };
        self.set_status(outcome);
    }

    fn copy_curser_row(&mut self) {
        let Some(&idx) = self.window.rows.get(self.curser_row) else {
            self.set_status("No record under the curser");
            return;
        };
        let line = export::clipboard_line(self.source.get(idx), &self.registry);
        self.clip(line, "row");
    }

    fn copy_curser_cell(&mut self) {
        let Some(&idx) = self.window.rows.get(self.curser_row) else {
            self.set_status("No record under the curser");
            return;
        };
        let Some((field, _)) = self.registry.visible_data().nth(self.curser_column) else {
            self.set_status("No column under the curser");
            return;
        };
        let content = self
            .source
            .get(idx)
            .value(field)
            .map(|value| value.to_string())
            .unwrap_or_default();
        self.clip(content, "cell");
    }

    fn copy_detail_row(&mut self) {
        let Some(&idx) = self.window.rows.get(self.detail_row) else {
            return;
        };
        let line = export::clipboard_line(self.source.get(idx), &self.registry);
        self.clip(line, "record");
    }

    fn copy_detail_cell(&mut self) {
        let Some(&idx) = self.window.rows.get(self.detail_row) else {
            return;
        };
        let field = Field::ALL[self.detail_offset];
        let content = self
            .source
            .get(idx)
            .value(field)
            .map(|value| value.to_string())
            .unwrap_or_default();
        self.clip(content, field.label());
    }

    fn export_page(&mut self) {
        let records: Vec<&PropertyRecord> = self
            .window
            .rows
            .iter()
            .map(|&idx| self.source.get(idx))
            .collect();
        let count = records.len();
        match export::export_csv(&records, &self.registry, &self.config.export_dir) {
            Ok(path) => {
                info!("Exported {count} rows to {}", path.display());
                self.set_status(format!("Exported {count} rows to {}", path.display()));
            }
            Err(e) => {
                warn!("CSV export failed: {e:?}");
                self.set_status(format!("Export failed: {e:?}"));
            }
        }
    }

    fn print_page(&mut self) {
        let cells: Vec<Vec<String>> = self
            .uidata
            .rows
            .iter()
            .map(|row| row.cells.clone())
            .collect();
        let document = export::text_snapshot(
            &self.uidata.title,
            &self.uidata.header,
            &cells,
            &self.uidata.results_line,
        );
        match self.printer.print(&document) {
            Ok(_) => self.set_status("Sent the current page to the print spooler"),
            Err(e) => {
                warn!("Print failed: {e:?}");
                self.set_status(format!("Print failed: {e:?}"));
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        debug!("Status: {}", self.status_message);
    }

    // ---- UI data assembly ----

    fn build_uidata(&self) -> UiData {
        UiData {
            title: format!(" {} · {} records ", self.name, self.source.len()),
            mode: self.mode,
            filter_line: self.filter_line(),
            header: self.build_header(),
            rows: self.build_rows(),
            selected_row: self.curser_row,
            // Shift past the checkbox column the curser never enters.
            selected_column: self.curser_column + 1,
            pagination: pagination_strip(self.state.page(), self.window.total_pages),
            results_line: self.results_line(),
            status_message: self.status_message.clone(),
            popup_message: HELP_TEXT.to_string(),
            detail: if self.mode == Mode::Detail {
                self.detail_data()
            } else {
                DetailData::default()
            },
            picker: match self.mode {
                Mode::Categories => self.categories_picker(),
                Mode::Columns => self.columns_picker(),
                _ => PickerData::default(),
            },
            input: self.last_input.clone(),
            input_active: self.mode == Mode::Input,
        }
    }

    fn build_header(&self) -> Vec<String> {
        let select_all = if self.select_all { "☑" } else { "☐" };
        let mut header = vec![select_all.to_string()];
        let sort = self.state.sort();
        for (field, column) in self.registry.visible_data() {
            if sort.key == Some(field) {
                header.push(format!("{} {}", column.label, sort.direction.indicator()));
            } else {
                header.push(column.label.to_string());
            }
        }
        header
    }

    fn build_rows(&self) -> Vec<UiRow> {
        self.window
            .rows
            .iter()
            .map(|&idx| {
                let record = self.source.get(idx);
                let selected = self.state.is_selected(record.id);
                let checkbox = if selected { "☑" } else { "☐" };
                let mut cells = vec![checkbox.to_string()];
                for (field, _) in self.registry.visible_data() {
                    cells.push(cell_value(record, field));
                }
                UiRow {
                    id: record.id,
                    selected,
                    cells,
                }
            })
            .collect()
    }

    fn detail_data(&self) -> DetailData {
        let Some(&idx) = self.window.rows.get(self.detail_row) else {
            return DetailData::default();
        };
        let record = self.source.get(idx);
        let absolute = (self.state.page() - 1) * self.state.page_size() + self.detail_row + 1;
        let rows = Field::ALL
            .iter()
            .map(|&field| (format!("{}:", field.label()), detail_value(record, field)))
            .collect();
        DetailData {
            title: format!(
                " Record {absolute} of {} · {} ",
                self.window.filtered_count, record.unique_id
            ),
            rows,
            offset: self.detail_offset,
        }
    }

    fn categories_picker(&self) -> PickerData {
        let items = self
            .category_entries
            .iter()
            .map(|(filter, count)| {
                let mark = if filter == self.state.category_filter() {
                    "●"
                } else {
                    " "
                };
                format!("{mark} {} ({count})", filter.label())
            })
            .collect();
        PickerData {
            title: " Filter by Category ".to_string(),
            items,
            selected: self.picker_curser,
        }
    }

    fn columns_picker(&self) -> PickerData {
        let items = self
            .registry
            .data_columns()
            .map(|(_, column)| {
                let mark = if column.visible { "☑" } else { "☐" };
                format!("{mark} {}", column.label)
            })
            .collect();
        PickerData {
            title: " Visible Columns ".to_string(),
            items,
            selected: self.picker_curser,
        }
    }

    fn results_line(&self) -> String {
        let mut line = if self.window.filtered_count == 0 {
            "No matching records".to_string()
        } else if self.window.rows.is_empty() {
            format!(
                "No rows on page {} of {} · {} results",
                self.state.page(),
                self.window.total_pages,
                self.window.filtered_count
            )
        } else {
            let first = (self.state.page() - 1) * self.state.page_size() + 1;
            let last = first + self.window.rows.len() - 1;
            format!(
                "Showing {first} to {last} of {} results",
                self.window.filtered_count
            )
        };
        if self.state.selected_count() > 0 {
            line.push_str(&format!(" · {} selected", self.state.selected_count()));
        }
        line
    }

    fn filter_line(&self) -> String {
        let mut parts = Vec::new();
        if !self.state.search_text().is_empty() {
            parts.push(format!("Search: \"{}\"", self.state.search_text()));
        }
        if !self.state.category_filter().is_all() {
            parts.push(format!("Category: {}", self.state.category_filter().label()));
        }
        let sort = self.state.sort();
        if let Some(field) = sort.key {
            parts.push(format!(
                "Sort: {} {}",
                field.label(),
                sort.direction.indicator()
            ));
        }
        parts.join(" · ")
    }
}

fn cell_value(record: &PropertyRecord, field: Field) -> String {
    match record.value(field) {
        None => String::new(),
        Some(value) if field.is_money() => format!("₹{value}"),
        Some(value) => value.to_string(),
    }
}

// Detail rows mark absent values instead of leaving a gap.
fn detail_value(record: &PropertyRecord, field: Field) -> String {
    match record.value(field) {
        None => "∅".to_string(),
        Some(value) if field.is_money() => format!("₹{value}"),
        Some(value) => value.to_string(),
    }
}

/// Windowed page strip: first and last page always shown, up to two
/// neighbours around the current page, gaps elided.
fn pagination_strip(page: usize, total_pages: usize) -> String {
    fn token(current: usize, n: usize) -> String {
        if n == current {
            format!("[{n}]")
        } else {
            n.to_string()
        }
    }

    if total_pages == 0 {
        return String::new();
    }

    let mut parts = vec!["◀".to_string()];
    if total_pages <= 9 {
        parts.extend((1..=total_pages).map(|n| token(page, n)));
    } else {
        let pivot = page.clamp(1, total_pages);
        let lo = pivot.saturating_sub(2).max(2);
        let hi = (pivot + 2).min(total_pages - 1);
        parts.push(token(page, 1));
        if lo > 2 {
            parts.push("…".to_string());
        }
        parts.extend((lo..=hi).map(|n| token(page, n)));
        if hi < total_pages - 1 {
            parts.push("…".to_string());
        }
        parts.push(token(page, total_pages));
    }
    parts.push("▶".to_string());
    parts.join(" ")
}
