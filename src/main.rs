//! Binary entry point: read configuration, start file logging, open the
//! catalogue store and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use library_catalogue::{init_logging, run_app, App, AppConfig, Library};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let _guard = init_logging(&config)?;
    info!("starting library catalogue v{}", env!("CARGO_PKG_VERSION"));

    let db_path = config.database_path()?;
    let library = Library::open(&db_path)
        .with_context(|| format!("failed to open catalogue at {}", db_path.display()))?;
    info!(
        books = library.catalogue().books().len(),
        members = library.catalogue().members().len(),
        "catalogue loaded"
    );

    let mut app = App::new(library);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        error!(error = %err, "exiting with error");
    }
    result
}
