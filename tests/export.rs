//! Export, print and clipboard surfaces, driven end to end over the
//! shared record fixture.

use std::fs;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use propview::columns::ColumnRegistry;
use propview::domain::{Message, PVConfig, PVError};
use propview::export::{EXPORT_FILE_NAME, PrintSurface, clipboard_line, csv_document};
use propview::model::Model;
use propview::records::{Field, PropertyRecord, RecordSource};

fn records() -> Vec<PropertyRecord> {
    serde_json::from_str(include_str!("fixtures/properties.json")).unwrap()
}

fn fixture() -> RecordSource {
    RecordSource::from_records(records()).unwrap()
}

fn fixture_model(config: &PVConfig) -> Model {
    Model::init("fixture", fixture(), config)
}

fn type_and_submit(model: &mut Model, text: &str) {
    model.update(Message::Search);
    for c in text.chars() {
        model.update(Message::RawKey(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )));
    }
    model.update(Message::RawKey(KeyEvent::new(
        KeyCode::Enter,
        KeyModifiers::NONE,
    )));
}

struct CapturePrinter(Arc<Mutex<Vec<String>>>);

impl PrintSurface for CapturePrinter {
    fn print(&mut self, document: &str) -> Result<(), PVError> {
        self.0.lock().unwrap().push(document.to_string());
        Ok(())
    }
}

#[test]
fn csv_document_follows_the_visible_registry() {
    let records = records();
    let registry = ColumnRegistry::from_fields(&[
        (Field::OwnerName, true),
        (Field::RegistrationAmount, true),
    ]);

    let csv = csv_document(&[&records[0], &records[1]], &registry);
    assert_eq!(
        csv,
        "Owner Name,Registration Amount\n\
         Ramesh Kumar,310000\n\
         Sunita Devi,145000"
    );
}

#[test]
fn export_message_writes_the_current_page_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = PVConfig::default().with_export_dir(dir.path());
    let mut model = fixture_model(&config);

    model.update(Message::NextPage);
    model.update(Message::ExportCsv);

    let content = fs::read_to_string(dir.path().join(EXPORT_FILE_NAME)).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(
        lines[0],
        "Serial No.,Scheme Name,Property Unique ID,Owner Name,Category,Plot Number,\
         Registration Amount,Registration Date"
    );
    assert_eq!(
        lines[1],
        "11,Hariyanv Awas Yojana,BIDA-HRV-1011,Pooja Bharti,MIG,P-11,298000,2024-03-11"
    );
    assert!(!content.ends_with('\n'));
    assert!(
        model
            .uidata()
            .status_message
            .starts_with("Exported 10 rows to ")
    );
}

#[test]
fn exporting_an_empty_page_still_writes_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let config = PVConfig::default().with_export_dir(dir.path());
    let mut model = fixture_model(&config);

    type_and_submit(&mut model, "zz");
    model.update(Message::ExportCsv);

    let content = fs::read_to_string(dir.path().join(EXPORT_FILE_NAME)).unwrap();
    assert_eq!(
        content,
        "Serial No.,Scheme Name,Property Unique ID,Owner Name,Category,Plot Number,\
         Registration Amount,Registration Date"
    );
}

#[test]
fn print_message_captures_the_rendered_page() {
    let documents = Arc::new(Mutex::new(Vec::new()));
    let mut model = fixture_model(&PVConfig::default());
    model.set_print_surface(Box::new(CapturePrinter(documents.clone())));

    model.update(Message::Print);

    let documents = documents.lock().unwrap();
    assert_eq!(documents.len(), 1);
    let document = &documents[0];
    assert!(document.contains("Serial No."));
    assert!(document.contains("Ramesh Kumar"));
    // The printout shows presentation values, unlike the raw CSV.
    assert!(document.contains("₹310000"));
    assert!(document.ends_with(&model.uidata().results_line));
    assert_eq!(
        model.uidata().status_message,
        "Sent the current page to the print spooler"
    );
}

#[test]
fn clipboard_line_quotes_cells_with_separators() {
    let records = records();
    let registry = ColumnRegistry::from_fields(&[
        (Field::OwnerName, true),
        (Field::RegistrationAmount, true),
    ]);
    assert_eq!(
        clipboard_line(&records[0], &registry),
        "\"Ramesh Kumar\",310000"
    );

    let registry = ColumnRegistry::from_fields(&[(Field::PermanentAddress, true)]);
    assert_eq!(
        clipboard_line(&records[0], &registry),
        "\"Ward 4, Gyanpur, Bhadohi\""
    );
}
