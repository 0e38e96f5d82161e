//! Catalog build errors

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error raised while building the sound board page
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("failed to render page: {0}")]
    Render(#[from] Box<handlebars::RenderError>),
}

impl CatalogError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<handlebars::TemplateError> for CatalogError {
    fn from(e: handlebars::TemplateError) -> Self {
        Self::Template(Box::new(e))
    }
}

impl From<handlebars::RenderError> for CatalogError {
    fn from(e: handlebars::RenderError) -> Self {
        Self::Render(Box::new(e))
    }
}
