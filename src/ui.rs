use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListState, Paragraph, Row, Table, TableState};

use crate::domain::Mode;
use crate::model::{DetailData, PickerData, UiData};

/// Stateless renderer. Everything shown comes out of the ui data the
/// model prepared, nothing is computed here beyond column widths.
#[derive(Debug, Default)]
pub struct Ui;

impl Ui {
    pub fn draw(&self, frame: &mut Frame, data: &UiData) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.draw_filter_line(frame, layout[0], data);
        self.draw_table(frame, layout[1], data);
        self.draw_pagination(frame, layout[2], data);
        self.draw_results_line(frame, layout[3], data);
        if data.input_active {
            self.draw_input_line(frame, layout[4], data);
        } else {
            self.draw_status_line(frame, layout[4], data);
        }

        match data.mode {
            Mode::Detail => self.draw_detail(frame, &data.detail),
            Mode::Categories => self.draw_picker(frame, &data.picker, " Enter apply · Esc close "),
            Mode::Columns => {
                self.draw_picker(frame, &data.picker, " Space/Enter toggle · Esc close ")
            }
            Mode::Popup => self.draw_help(frame, data),
            _ => (),
        }
    }

    fn draw_filter_line(&self, frame: &mut Frame, area: Rect, data: &UiData) {
        if data.filter_line.is_empty() {
            return;
        }
        frame.render_widget(Line::from(data.filter_line.as_str()).cyan(), area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, data: &UiData) {
        let widths = column_widths(data);
        let header = Row::new(data.header.iter().map(|h| h.as_str())).bold();
        let rows = data.rows.iter().map(|row| {
            let cells = row.cells.iter().map(|c| c.as_str());
            if row.selected {
                Row::new(cells).yellow()
            } else {
                Row::new(cells)
            }
        });
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(data.title.as_str()))
            .column_spacing(1)
            .row_highlight_style(Style::new().reversed())
            .column_highlight_style(Style::new().bold())
            .cell_highlight_style(Style::new().reversed().bold());

        let mut state = TableState::default();
        if !data.rows.is_empty() {
            state.select(Some(data.selected_row));
            state.select_column(Some(data.selected_column));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_pagination(&self, frame: &mut Frame, area: Rect, data: &UiData) {
        if data.pagination.is_empty() {
            return;
        }
        frame.render_widget(Paragraph::new(data.pagination.as_str()).centered(), area);
    }

    fn draw_results_line(&self, frame: &mut Frame, area: Rect, data: &UiData) {
        frame.render_widget(Line::from(data.results_line.as_str()), area);
    }

    fn draw_status_line(&self, frame: &mut Frame, area: Rect, data: &UiData) {
        frame.render_widget(Line::from(data.status_message.as_str()).dim(), area);
    }

    fn draw_input_line(&self, frame: &mut Frame, area: Rect, data: &UiData) {
        let line = Line::from(vec![
            Span::from("search> ").bold(),
            Span::from(data.input.input.as_str()),
        ]);
        frame.render_widget(line, area);
        let x = input_curser_x(area, data.input.curser_pos);
        frame.set_cursor_position(Position::new(x, area.y));
    }

    fn draw_detail(&self, frame: &mut Frame, detail: &DetailData) {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);
        let lines: Vec<Line> = detail
            .rows
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::from(format!("{label:<22} ")).dim(),
                    Span::from(value.as_str()),
                ])
            })
            .collect();
        let body = Paragraph::new(lines)
            .scroll((detail.offset as u16, 0))
            .block(
                Block::bordered()
                    .title(detail.title.as_str())
                    .title_bottom(Line::from(" ←/→ record · Esc close ").centered()),
            );
        frame.render_widget(body, area);
    }

    fn draw_picker(&self, frame: &mut Frame, picker: &PickerData, hint: &str) {
        let area = centered_rect(40, 60, frame.area());
        frame.render_widget(Clear, area);
        let items = picker.items.iter().map(|item| item.as_str());
        let list = List::new(items)
            .highlight_style(Style::new().reversed())
            .block(
                Block::bordered()
                    .title(picker.title.as_str())
                    .title_bottom(Line::from(hint).centered()),
            );
        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_help(&self, frame: &mut Frame, data: &UiData) {
        let area = centered_rect(60, 80, frame.area());
        frame.render_widget(Clear, area);
        let popup = Paragraph::new(data.popup_message.as_str()).block(
            Block::bordered()
                .title(" Help ")
                .title_bottom(Line::from(" Esc close ").centered()),
        );
        frame.render_widget(popup, area);
    }
}

// Column width follows the widest cell, capped so one long address
// cannot push everything else off screen.
fn column_widths(data: &UiData) -> Vec<Constraint> {
    let ncols = data.header.len();
    let mut widths = vec![0usize; ncols];
    for (i, cell) in data.header.iter().enumerate() {
        widths[i] = widths[i].max(cell.chars().count());
    }
    for row in &data.rows {
        for (i, cell) in row.cells.iter().enumerate().take(ncols) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    widths
        .into_iter()
        .map(|w| Constraint::Length(w.min(38) as u16))
        .collect()
}

// Terminal cell of the input curser, behind the 8-char prompt. Always
// inside the input line, however long the typed text grows.
fn input_curser_x(area: Rect, curser_pos: usize) -> u16 {
    let offset = curser_pos.min(usize::from(u16::MAX)) as u16;
    area.x
        .saturating_add(8)
        .saturating_add(offset)
        .min(area.right().saturating_sub(1))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
