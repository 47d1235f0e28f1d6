mod clipboard;
mod config;
mod delete;
mod index;
mod metadata;
mod resolve;
mod scan;

pub use clipboard::*;
pub use config::*;
pub use delete::*;
pub use index::*;
pub use metadata::*;
pub use resolve::*;
pub use scan::*;
