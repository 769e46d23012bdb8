pub mod catalog;
pub mod report;
pub mod trace_file;

pub use catalog::{load_catalog, render_catalog, CatalogSource};
pub use report::{render_comparison, write_output, ReportFormat};
pub use trace_file::{load_trace, parse_trace, save_trace, write_trace};
