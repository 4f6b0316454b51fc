pub mod export;
pub mod persistence;
pub mod settings;

pub use export::{export_to_dir, ExportOutcome};
pub use settings::StudioSettings;
