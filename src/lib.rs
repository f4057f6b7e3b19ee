pub mod column_filter;
pub mod combine;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod export;
pub mod extract;
pub mod framework;
pub mod grid_builder;
pub mod host;
pub mod model;
pub mod naming;
pub mod options;
pub mod page;

pub use discovery::{ExportTarget, InstrumentedRegistry, Scanner};
pub use dom::{AssumeVisible, StyleOracle, VisibilityOracle};
pub use error::{ExportError, HostError, PageError};
pub use export::{export, to_csv, to_xlsx};
pub use extract::{Classification, Extractor, classify, extract, extract_table};
pub use framework::TableKind;
pub use host::{
    DirectorySink, DownloadSink, FallbackLocalizer, JsonSettingsFile, Localizer, MessageCatalog,
    SettingsStore,
};
pub use model::{CellPos, ExtractionResult, Link, MergeRegion};
pub use naming::{export_file_name, sanitize_export_name, sheet_name_for};
pub use options::{ExportFormat, ExtractOptions, Settings};
pub use page::Page;
