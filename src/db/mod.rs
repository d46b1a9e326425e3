//! Persistence module split across logical submodules.

mod catalogue;
mod connection;
mod kv;

pub use catalogue::{load_catalogue, save_catalogue, BOOKS_KEY, MEMBERS_KEY};
pub use connection::{open_in_memory, open_store};
pub use kv::{read_value, write_value};
