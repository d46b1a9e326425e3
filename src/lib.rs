//! Core library surface for the library catalogue manager.
//!
//! The catalogue rules live in [`catalogue`] and have no I/O; [`db`] mirrors
//! them to an embedded key-value store and [`library`] ties the two together
//! for the terminal front-end in [`ui`].
pub mod catalogue;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod ui;

pub use catalogue::Catalogue;
pub use config::AppConfig;
pub use error::{CatalogueError, CatalogueResult};
pub use library::Library;
pub use logging::init_logging;

/// The two primary domain types that other layers manipulate.
pub use models::{Book, BookId, Member, MemberId};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
