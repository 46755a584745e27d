//! Quick-entry tiles built from presets.

use crate::model::preset::LogEntryPreset;
use crate::model::productivity::ProductivityLevel;

pub const LOG_NEW_ACTIVITY_NAME: &str = "Log New Activity";
pub const LOG_NEW_ACTIVITY_ICON: &str = "➕";

/// One tile. `preset` is `None` for the tile that opens a blank entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetOption {
    pub icon: String,
    pub name: String,
    pub preset: Option<LogEntryPreset>,
}

impl PresetOption {
    pub fn from_preset(preset: &LogEntryPreset) -> Self {
        Self {
            icon: preset.icon.clone(),
            name: preset.name.clone(),
            preset: Some(preset.clone()),
        }
    }

    pub fn log_new_activity() -> Self {
        Self {
            icon: LOG_NEW_ACTIVITY_ICON.to_string(),
            name: LOG_NEW_ACTIVITY_NAME.to_string(),
            preset: None,
        }
    }
}

/// Tiles sharing one productivity level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetSection {
    pub productivity_level: ProductivityLevel,
    pub title: &'static str,
    pub options: Vec<PresetOption>,
}

/// Groups presets by level in [`ProductivityLevel::ALL`] order.
///
/// Empty sections are omitted; names are sorted within a section.
pub fn preset_sections(presets: &[LogEntryPreset]) -> Vec<PresetSection> {
    ProductivityLevel::ALL
        .iter()
        .filter_map(|level| {
            let mut matching = presets
                .iter()
                .filter(|preset| preset.productivity_level == *level)
                .collect::<Vec<_>>();
            if matching.is_empty() {
                return None;
            }
            matching.sort_by(|left, right| left.name.cmp(&right.name));
            Some(PresetSection {
                productivity_level: *level,
                title: level.display_name(),
                options: matching.into_iter().map(PresetOption::from_preset).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{preset_sections, PresetOption, LOG_NEW_ACTIVITY_ICON};
    use crate::model::preset::LogEntryPreset;
    use crate::model::productivity::ProductivityLevel;
    use uuid::Uuid;

    fn preset(name: &str, level: ProductivityLevel) -> LogEntryPreset {
        LogEntryPreset {
            id: Uuid::new_v4(),
            name: name.to_string(),
            productivity_level: level,
            icon: "⭐".to_string(),
        }
    }

    #[test]
    fn sections_follow_level_order_and_skip_empty_levels() {
        let presets = vec![
            preset("Scrolling", ProductivityLevel::None),
            preset("Writing", ProductivityLevel::High),
            preset("Reading", ProductivityLevel::High),
        ];

        let sections = preset_sections(&presets);
        let levels = sections
            .iter()
            .map(|section| section.productivity_level)
            .collect::<Vec<_>>();
        assert_eq!(levels, vec![ProductivityLevel::High, ProductivityLevel::None]);

        let names = sections[0]
            .options
            .iter()
            .map(|option| option.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Reading", "Writing"]);
        assert_eq!(sections[1].title, "Not Productive");
    }

    #[test]
    fn no_presets_means_no_sections() {
        assert!(preset_sections(&[]).is_empty());
    }

    #[test]
    fn log_new_activity_tile_has_no_preset() {
        let tile = PresetOption::log_new_activity();
        assert_eq!(tile.icon, LOG_NEW_ACTIVITY_ICON);
        assert!(tile.preset.is_none());
    }
}
