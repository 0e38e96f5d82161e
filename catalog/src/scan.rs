//! Asset directory scan

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::CatalogError;
use crate::label::button_label;
use crate::model::{Catalog, ProjectSounds, SoundAsset};
use crate::settings::CatalogSettings;

/// Build the catalog for `projects` checked out under `root`
///
/// A project is listed only when `<root>/<project>/<sounds_dir>` exists and
/// holds at least one recognized asset. Group ids are numbered over the
/// listed projects.
pub fn scan(
    root: &Path,
    projects: &[String],
    settings: &CatalogSettings,
) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::default();

    for project in projects {
        let dir = root.join(project).join(&settings.sounds_dir);
        if !dir.is_dir() {
            debug!("Skipping {}: no {} directory", project, settings.sounds_dir);
            continue;
        }

        let files = asset_files(&dir, &settings.extensions)?;
        if files.is_empty() {
            debug!("Skipping {}: no recognized assets", project);
            continue;
        }

        let sounds = files
            .into_iter()
            .map(|file| SoundAsset {
                label: button_label(&file, settings.max_label_length),
                locator: format!(
                    "{}{}/{}/{}",
                    settings.asset_prefix, project, settings.sounds_dir, file
                ),
                title: file,
            })
            .collect();

        let index = catalog.projects.len();
        catalog
            .projects
            .push(ProjectSounds::new(index, project.as_str(), sounds));
    }

    Ok(catalog)
}

/// File names directly inside `dir` with a recognized extension
///
/// Grouped by extension in `extensions` order, each group sorted by name.
/// Extensions match case-sensitively and hidden files are ignored.
pub fn asset_files(dir: &Path, extensions: &[String]) -> Result<Vec<String>, CatalogError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| CatalogError::io(dir, e.into()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) if !name.starts_with('.') => names.push(name.to_string()),
            Some(_) => {}
            None => warn!("Ignoring non UTF-8 file name {}", path.display()),
        }
    }

    let mut files = Vec::new();
    for extension in extensions {
        let mut group: Vec<String> = names
            .iter()
            .filter(|name| {
                Path::new(name.as_str()).extension().and_then(|e| e.to_str())
                    == Some(extension.as_str())
            })
            .cloned()
            .collect();
        group.sort();
        files.append(&mut group);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"data").unwrap();
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_groups_by_extension_then_name() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["b.wav", "a.wav", "z.mp3", "c.mp3", "notes.txt", "LOUD.WAV", ".hidden.wav"] {
            touch(dir.path(), file);
        }
        fs::create_dir(dir.path().join("nested.wav")).unwrap();

        let files = asset_files(dir.path(), &names(&["mp3", "wav"])).unwrap();
        assert_eq!(files, ["c.mp3", "z.mp3", "a.wav", "b.wav"]);
    }

    #[test]
    fn test_does_not_descend() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "top.wav");
        touch(dir.path(), "sub/deep.wav");

        let files = asset_files(dir.path(), &names(&["wav"])).unwrap();
        assert_eq!(files, ["top.wav"]);
    }

    #[test]
    fn test_scan_filters_projects_and_builds_locators() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), "alpha/sounds/click.wav");
        touch(root.path(), "alpha/sounds/an-extremely-long-sound-name.mp3");
        touch(root.path(), "beta/README.md");
        touch(root.path(), "gamma/sounds/readme.txt");
        touch(root.path(), "delta/sounds/ding.mp3");

        let projects = names(&["alpha", "beta", "gamma", "delta", "missing"]);
        let catalog = scan(root.path(), &projects, &CatalogSettings::default()).unwrap();

        let listed: Vec<_> = catalog.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(listed, ["alpha", "delta"]);

        let alpha = &catalog.projects[0];
        assert_eq!(alpha.heading_id, "heading0");
        assert!(alpha.expanded);
        assert_eq!(
            alpha.sounds[0],
            SoundAsset {
                title: "an-extremely-long-sound-name.mp3".to_string(),
                label: "an-extremely-long-soun...".to_string(),
                locator: "../../alpha/sounds/an-extremely-long-sound-name.mp3".to_string(),
            }
        );
        assert_eq!(alpha.sounds[1].locator, "../../alpha/sounds/click.wav");

        let delta = &catalog.projects[1];
        assert_eq!(delta.collapse_id, "collapse1");
        assert!(!delta.expanded);
        assert_eq!(catalog.sound_count(), 3);
    }

    #[test]
    fn test_custom_layout() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), "alpha/audio/click.wav");
        touch(root.path(), "alpha/audio/ding.mp3");

        let settings = CatalogSettings {
            sounds_dir: "audio".to_string(),
            extensions: names(&["wav"]),
            asset_prefix: "/assets/".to_string(),
            ..CatalogSettings::default()
        };
        let catalog = scan(root.path(), &names(&["alpha"]), &settings).unwrap();

        let triggers: Vec<_> = catalog.triggers().collect();
        assert_eq!(triggers, [("click.wav", "/assets/alpha/audio/click.wav")]);
    }
}
