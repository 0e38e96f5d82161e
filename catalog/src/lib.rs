//! Skiffle catalog - sound board page builder
//!
//! Reads a list of project names, scans each project's sounds directory and
//! renders one trigger button per asset into a static HTML page. Each
//! button carries the asset's page-relative locator, which is exactly what
//! `skiffle_playback::PlaybackCache::play` accepts.
//!
//! ```text
//! active-repos ──► read_project_list ──► scan ──► Catalog ──► PageRenderer ──► sound-board.html
//! ```

mod builder;
mod error;
mod label;
mod model;
mod projects;
mod render;
mod scan;
mod settings;

pub use builder::{BuildReport, CatalogBuilder};
pub use error::CatalogError;
pub use label::button_label;
pub use model::{Catalog, ProjectSounds, SoundAsset};
pub use projects::{parse_project_list, read_project_list};
pub use render::{BUILD_MESSAGE, PageRenderer};
pub use scan::{asset_files, scan};
pub use settings::CatalogSettings;
