pub mod cache;
pub mod index;
pub mod loader;
pub mod model;
pub mod normalize;

pub use cache::TtlCache;
pub use index::FilterIndex;
pub use loader::{load_bundle, load_table, DatasetSource, DirectorySource};
pub use model::{CellValue, DatasetBundle, DatasetName, Record, Table};
pub use normalize::normalize_table;
