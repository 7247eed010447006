use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use propview::controller::Controller;
use propview::domain::{PAGE_SIZE, PVConfig, PVError};
use propview::model::{Model, Status};
use propview::records::RecordSource;
use propview::ui::Ui;

/// Browse property allotment records in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON records file, bundled sample data when omitted
    file: Option<String>,

    /// Append logs to this file, off by default
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Rows per table page
    #[arg(long, default_value_t = PAGE_SIZE)]
    page_size: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging to the terminal would fight the ui for the screen, so
    // logs only go to a file and only when asked for.
    if let Some(path) = &cli.log_file
        && let Err(e) = init_tracing(path)
    {
        eprintln!("Could not open log file: {e:?}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing(path: &Path) -> Result<(), PVError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn load_source(cli: &Cli) -> Result<(String, RecordSource), PVError> {
    match &cli.file {
        Some(raw) => {
            let expanded =
                shellexpand::full(raw).map_err(|e| PVError::LoadingFailed(format!("{raw}: {e}")))?;
            let path = PathBuf::from(expanded.as_ref());
            let source = RecordSource::load_file(&path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "records".to_string());
            Ok((name, source))
        }
        None => Ok(("sample records".to_string(), RecordSource::sample()?)),
    }
}

fn run(cli: &Cli) -> Result<(), PVError> {
    let (name, source) = load_source(cli)?;
    info!("Loaded {} records from {name}", source.len());

    let config = PVConfig::default().with_page_size(cli.page_size);
    let mut model = Model::init(name, source, &config);
    let controller = Controller::new(&config);
    let ui = Ui::default();

    let mut terminal = ratatui::init();
    let result = event_loop(&mut model, &controller, &ui, &mut terminal);
    ratatui::restore();
    result
}

fn event_loop(
    model: &mut Model,
    controller: &Controller,
    ui: &Ui,
    terminal: &mut ratatui::DefaultTerminal,
) -> Result<(), PVError> {
    while model.status != Status::Quitting {
        terminal.draw(|frame| ui.draw(frame, model.uidata()))?;
        if let Some(message) = controller.handle_event(model)? {
            model.update(message);
        }
    }
    Ok(())
}
