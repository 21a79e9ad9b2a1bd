//! Start menu and settings screen

use crate::settings::{BLOCK_STYLES, Settings};

/// Menu screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    Settings,
}

/// Menu state
#[derive(Debug, Clone)]
pub struct Menu {
    pub screen: MenuScreen,
    pub selected: usize,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub item_type: MenuItemType,
}

#[derive(Debug, Clone)]
pub enum MenuItemType {
    /// Simple button that triggers an action
    Button(MenuAction),
    /// Toggle boolean setting
    Toggle { key: SettingKey, value: bool },
    /// Cycle through options
    Cycle {
        key: SettingKey,
        options: Vec<String>,
        current: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    GoToScreen(MenuScreen),
    Back,
    Quit,
}

/// Setting keys for identifying which setting to modify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ShowPreview,
    BlockStyle,
    Particles,
    ScreenShake,
}

impl Menu {
    pub fn new() -> Self {
        Self::main_menu()
    }

    pub fn main_menu() -> Self {
        Self {
            screen: MenuScreen::Main,
            selected: 0,
            items: vec![
                MenuItem {
                    label: "Play".to_string(),
                    item_type: MenuItemType::Button(MenuAction::StartGame),
                },
                MenuItem {
                    label: "Settings".to_string(),
                    item_type: MenuItemType::Button(MenuAction::GoToScreen(MenuScreen::Settings)),
                },
                MenuItem {
                    label: "Quit".to_string(),
                    item_type: MenuItemType::Button(MenuAction::Quit),
                },
            ],
        }
    }

    pub fn settings_menu(settings: &Settings) -> Self {
        let current_style = BLOCK_STYLES
            .iter()
            .position(|s| *s == settings.visual.block_style)
            .unwrap_or(0);

        Self {
            screen: MenuScreen::Settings,
            selected: 0,
            items: vec![
                MenuItem {
                    label: "Placement Preview".to_string(),
                    item_type: MenuItemType::Toggle {
                        key: SettingKey::ShowPreview,
                        value: settings.visual.show_preview,
                    },
                },
                MenuItem {
                    label: "Block Style".to_string(),
                    item_type: MenuItemType::Cycle {
                        key: SettingKey::BlockStyle,
                        options: BLOCK_STYLES.iter().map(|s| s.to_string()).collect(),
                        current: current_style,
                    },
                },
                MenuItem {
                    label: "Particles".to_string(),
                    item_type: MenuItemType::Toggle {
                        key: SettingKey::Particles,
                        value: settings.effects.particles,
                    },
                },
                MenuItem {
                    label: "Screen Shake".to_string(),
                    item_type: MenuItemType::Toggle {
                        key: SettingKey::ScreenShake,
                        value: settings.effects.screen_shake,
                    },
                },
                MenuItem {
                    label: "Back".to_string(),
                    item_type: MenuItemType::Button(MenuAction::Back),
                },
            ],
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }

    /// Handle left for cycling options and toggles
    pub fn adjust_left(&mut self, settings: &mut Settings) {
        self.adjust(settings, false);
    }

    /// Handle right for cycling options and toggles
    pub fn adjust_right(&mut self, settings: &mut Settings) {
        self.adjust(settings, true);
    }

    fn adjust(&mut self, settings: &mut Settings, forward: bool) {
        let Some(item) = self.items.get_mut(self.selected) else {
            return;
        };
        match &mut item.item_type {
            MenuItemType::Toggle { key, value } => {
                *value = !*value;
                apply_setting(settings, *key, &SettingValue::Bool(*value));
            }
            MenuItemType::Cycle { key, options, current } => {
                *current = if forward {
                    (*current + 1) % options.len()
                } else if *current == 0 {
                    options.len() - 1
                } else {
                    *current - 1
                };
                apply_setting(settings, *key, &SettingValue::String(options[*current].clone()));
            }
            MenuItemType::Button(_) => {}
        }
    }

    /// Get the action for the current selection (for Button types)
    pub fn select(&self) -> Option<MenuAction> {
        match self.items.get(self.selected)?.item_type {
            MenuItemType::Button(action) => Some(action),
            _ => None,
        }
    }

    pub fn go_to(&mut self, screen: MenuScreen, settings: &Settings) {
        *self = match screen {
            MenuScreen::Main => Self::main_menu(),
            MenuScreen::Settings => Self::settings_menu(settings),
        };
    }

    /// Go back to previous screen
    pub fn go_back(&mut self, settings: &Settings) {
        self.go_to(MenuScreen::Main, settings);
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper enum for setting values
enum SettingValue {
    Bool(bool),
    String(String),
}

/// Apply a setting change to the Settings struct
fn apply_setting(settings: &mut Settings, key: SettingKey, value: &SettingValue) {
    match (key, value) {
        (SettingKey::ShowPreview, SettingValue::Bool(v)) => {
            settings.visual.show_preview = *v;
        }
        (SettingKey::BlockStyle, SettingValue::String(v)) => {
            settings.visual.block_style = v.clone();
        }
        (SettingKey::Particles, SettingValue::Bool(v)) => {
            settings.effects.particles = *v;
        }
        (SettingKey::ScreenShake, SettingValue::Bool(v)) => {
            settings.effects.screen_shake = *v;
        }
        _ => {}
    }
}
