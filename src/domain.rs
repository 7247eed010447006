use std::io;
use std::path::PathBuf;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

// Rows shown per table page.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug)]
pub enum PVError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    LoadingFailed(String),
    DuplicateId(u64),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    PrintFailed(String),
}

impl From<io::Error> for PVError {
    fn from(err: io::Error) -> Self {
        PVError::IoError(err)
    }
}

impl From<serde_json::Error> for PVError {
    fn from(err: serde_json::Error) -> Self {
        PVError::JsonError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(into, prefix = "with_")]
pub struct PVConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
    pub export_dir: PathBuf,
}

impl Default for PVConfig {
    fn default() -> Self {
        PVConfig {
            event_poll_time: 100,
            page_size: PAGE_SIZE,
            export_dir: PathBuf::from("."),
        }
    }
}

// Which view currently owns the key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Table,
    Detail,
    Categories,
    Columns,
    Popup,
    Input,
}

// One user intention, as mapped from a key event by the controller.
// The model decides what a message means in the current mode.
#[derive(Debug, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Search,
    Categories,
    Columns,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GotoPage(usize),
    ToggleSelection,
    ToggleSelectAll,
    Sort,
    ExportCsv,
    Print,
    CopyRow,
    CopyCell,
    Enter,
    Exit,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
propview - property records browser

  Up/k  Down/j    move row curser
  Left/h Right/l  move column curser
  n/PgDn p/PgUp   next / previous page
  g/Home G/End    first / last page
  1-9             jump to page
  /               search all fields
  f               filter by category
  c               choose visible columns
  s               sort by the current column
  Space           select / deselect row
  a               select / deselect current page
  Enter           open record details
  y / Y           copy row / cell
  e               export current page to CSV
  P               print current page
  Esc             close view / clear filters
  q               quit
  ?               this help
";
