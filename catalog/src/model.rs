//! Sound board data passed to the page template

use serde::Serialize;

/// One playable asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoundAsset {
    /// Bare file name, shown as the button tooltip
    pub title: String,
    /// Possibly truncated button text
    pub label: String,
    /// Page-relative URL the trigger plays
    pub locator: String,
}

/// Collapsible group of one project's assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSounds {
    pub name: String,
    pub heading_id: String,
    pub collapse_id: String,
    /// Only the first group starts expanded
    pub expanded: bool,
    pub sounds: Vec<SoundAsset>,
}

impl ProjectSounds {
    /// Group at position `index` of the page
    pub fn new(index: usize, name: impl Into<String>, sounds: Vec<SoundAsset>) -> Self {
        Self {
            name: name.into(),
            heading_id: format!("heading{index}"),
            collapse_id: format!("collapse{index}"),
            expanded: index == 0,
            sounds,
        }
    }
}

/// Every project with at least one asset, in project list order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub projects: Vec<ProjectSounds>,
}

impl Catalog {
    /// `(label, locator)` pairs in page order
    pub fn triggers(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.projects
            .iter()
            .flat_map(|p| p.sounds.iter())
            .map(|s| (s.label.as_str(), s.locator.as_str()))
    }

    pub fn sound_count(&self) -> usize {
        self.projects.iter().map(|p| p.sounds.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(name: &str) -> SoundAsset {
        SoundAsset {
            title: name.to_string(),
            label: name.to_string(),
            locator: format!("../../p/sounds/{name}"),
        }
    }

    #[test]
    fn test_group_ids_and_expansion() {
        let first = ProjectSounds::new(0, "alpha", vec![sound("a.wav")]);
        let third = ProjectSounds::new(2, "gamma", vec![sound("c.wav")]);
        assert_eq!(first.heading_id, "heading0");
        assert_eq!(first.collapse_id, "collapse0");
        assert!(first.expanded);
        assert_eq!(third.heading_id, "heading2");
        assert!(!third.expanded);
    }

    #[test]
    fn test_triggers_follow_page_order() {
        let catalog = Catalog {
            projects: vec![
                ProjectSounds::new(0, "alpha", vec![sound("a.wav"), sound("b.wav")]),
                ProjectSounds::new(1, "beta", vec![sound("c.mp3")]),
            ],
        };
        let labels: Vec<_> = catalog.triggers().map(|(label, _)| label).collect();
        assert_eq!(labels, ["a.wav", "b.wav", "c.mp3"]);
        assert_eq!(catalog.sound_count(), 3);
    }
}
