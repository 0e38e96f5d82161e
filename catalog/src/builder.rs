//! Catalog build: project list -> scan -> page

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CatalogError;
use crate::model::Catalog;
use crate::projects::read_project_list;
use crate::render::PageRenderer;
use crate::scan::scan;
use crate::settings::CatalogSettings;

/// Summary of a finished build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output: PathBuf,
    pub projects: usize,
    pub sounds: usize,
}

/// Builds the sound board page from [`CatalogSettings`]
pub struct CatalogBuilder {
    settings: CatalogSettings,
    base_dir: PathBuf,
}

impl CatalogBuilder {
    /// Builder resolving relative settings paths against the working directory
    pub fn new(settings: CatalogSettings) -> Self {
        Self {
            settings,
            base_dir: PathBuf::from("."),
        }
    }

    /// Resolve relative settings paths against `dir`
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Where the page is written
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.settings.output)
    }

    /// Read the project list and scan every project
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        let list = self.resolve(&self.settings.project_list);
        let projects = read_project_list(&list)?;
        debug!("{} projects listed in {}", projects.len(), list.display());

        scan(
            &self.resolve(&self.settings.projects_root),
            &projects,
            &self.settings,
        )
    }

    /// Scan, render and write the page
    pub fn build(&self) -> Result<BuildReport, CatalogError> {
        let renderer = match &self.settings.template {
            Some(template) => PageRenderer::from_file(&self.resolve(template))?,
            None => PageRenderer::new()?,
        };

        let catalog = self.catalog()?;
        let page = renderer.render(&catalog)?;

        let output = self.output_path();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
        }
        std::fs::write(&output, page).map_err(|e| CatalogError::io(&output, e))?;

        let report = BuildReport {
            output,
            projects: catalog.projects.len(),
            sounds: catalog.sound_count(),
        };
        info!(
            "Build complete: {} sounds from {} projects -> {}",
            report.sounds,
            report.projects,
            report.output.display()
        );
        Ok(report)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
