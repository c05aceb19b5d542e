//! Reader settings and where they live on disk.

mod paths;
mod settings;

pub use paths::AppPaths;
pub use settings::ReaderSettings;
