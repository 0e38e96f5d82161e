//! Page rendering

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::CatalogError;
use crate::model::{Catalog, ProjectSounds};

/// Comment placed at the top of every generated page
pub const BUILD_MESSAGE: &str = "<!-- WARNING: This file was built, not hand generated, and should not be manually edited.  Use `skiffle build` to re-build. -->";

const BUILT_IN_TEMPLATE: &str = include_str!("../templates/sound-board.hbs");
const TEMPLATE_NAME: &str = "sound-board";

#[derive(Serialize)]
struct PageData<'a> {
    build_message: &'a str,
    projects: &'a [ProjectSounds],
}

/// Renders a [`Catalog`] into the sound board page
///
/// Templates are compiled in strict mode: a reference to a field the page
/// data does not have is a render error rather than an empty string.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    /// Renderer using the built-in template
    pub fn new() -> Result<Self, CatalogError> {
        Self::from_template(BUILT_IN_TEMPLATE)
    }

    pub fn from_template(source: &str) -> Result<Self, CatalogError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_template_string(TEMPLATE_NAME, source)?;
        Ok(Self { registry })
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        Self::from_template(&source)
    }

    pub fn render(&self, catalog: &Catalog) -> Result<String, CatalogError> {
        let data = PageData {
            build_message: BUILD_MESSAGE,
            projects: &catalog.projects,
        };
        Ok(self.registry.render(TEMPLATE_NAME, &data)?)
    }
}
