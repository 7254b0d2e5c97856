use crate::constants::menu;
use crate::shift::format_offset;
use crate::ticker::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Disabled text line
    Label {
        id: Option<&'static str>,
        text: String,
    },
    Action {
        id: &'static str,
        text: &'static str,
    },
    Toggle {
        id: &'static str,
        text: &'static str,
        checked: bool,
    },
    Separator,
}

/// What the tray menu offers beyond the snapshot itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    pub can_disable_shift: bool,
    pub launch_at_login: bool,
}

/// Only a stored, enabled record can be turned off from the tray. A pinned
/// shift lives in the settings and keeps showing regardless.
pub fn shift_can_be_disabled(pinned: bool, stored_active: bool) -> bool {
    !pinned && stored_active
}

pub fn entries(snapshot: Option<&Snapshot>, state: MenuState) -> Vec<MenuEntry> {
    let mut items = Vec::new();

    if let Some(snapshot) = snapshot {
        items.push(MenuEntry::Label {
            id: Some(menu::PHASE),
            text: format!(
                "{}  ·  {}m left",
                snapshot.phase.label(),
                snapshot.remaining_minutes
            ),
        });
        items.push(MenuEntry::Label {
            id: None,
            text: snapshot.next_milestone.to_string(),
        });
        items.push(MenuEntry::Separator);

        let status = match snapshot.offset_minutes {
            Some(offset) => format!("Shift on ({})", format_offset(offset)),
            None => "Shift off".to_string(),
        };
        items.push(MenuEntry::Label {
            id: Some(menu::SHIFT_STATUS),
            text: status,
        });

        if state.can_disable_shift {
            items.push(MenuEntry::Action {
                id: menu::SHIFT_OFF,
                text: "Turn off shift",
            });
        }

        items.push(MenuEntry::Separator);
    }

    items.push(MenuEntry::Action {
        id: menu::SHOW,
        text: "Show",
    });
    items.push(MenuEntry::Toggle {
        id: menu::LAUNCH_AT_LOGIN,
        text: "Launch at Login",
        checked: state.launch_at_login,
    });
    items.push(MenuEntry::Separator);
    items.push(MenuEntry::Label {
        id: None,
        text: format!("Centi·Hour v{}", env!("CARGO_PKG_VERSION")),
    });
    items.push(MenuEntry::Separator);
    items.push(MenuEntry::Action {
        id: menu::QUIT,
        text: "Quit",
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::settings::{AppSettings, PinnedShift};
    use crate::shift::ShiftStore;
    use crate::store::MemoryStore;
    use crate::ticker::Ticker;
    use chrono::{Local, TimeZone};

    fn snapshot(settings: &AppSettings, stored_offset: Option<i32>) -> Snapshot {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap();
        let store = MemoryStore::new();
        let shifts = ShiftStore::new(&store);
        if let Some(offset) = stored_offset {
            shifts.save(
                "10:00".parse().unwrap(),
                "06:00".parse().unwrap(),
                offset,
                true,
            );
        }
        Ticker::new(FixedClock::new(now), shifts, settings).tick()
    }

    fn ids(items: &[MenuEntry]) -> Vec<&'static str> {
        items
            .iter()
            .filter_map(|item| match item {
                MenuEntry::Label { id, .. } => *id,
                MenuEntry::Action { id, .. } | MenuEntry::Toggle { id, .. } => Some(*id),
                MenuEntry::Separator => None,
            })
            .collect()
    }

    fn pinned_settings() -> AppSettings {
        AppSettings {
            pinned_shift: Some(PinnedShift {
                actual_wake: "08:30".parse().unwrap(),
                ideal_wake: "07:00".parse().unwrap(),
            }),
            ..AppSettings::default()
        }
    }

    #[test]
    fn pinned_shift_blocks_turn_off() {
        assert!(shift_can_be_disabled(false, true));
        assert!(!shift_can_be_disabled(true, true));
        assert!(!shift_can_be_disabled(true, false));
        assert!(!shift_can_be_disabled(false, false));
    }

    #[test]
    fn pinned_shift_menu_has_no_turn_off_item() {
        let settings = pinned_settings();
        let snap = snapshot(&settings, Some(240));
        let state = MenuState {
            can_disable_shift: shift_can_be_disabled(settings.pinned_shift.is_some(), true),
            launch_at_login: false,
        };

        let items = entries(Some(&snap), state);
        assert!(!ids(&items).contains(&menu::SHIFT_OFF));
        assert!(items.contains(&MenuEntry::Label {
            id: Some(menu::SHIFT_STATUS),
            text: "Shift on (+1h 30m)".to_string(),
        }));
    }

    #[test]
    fn stored_shift_menu_offers_turn_off() {
        let snap = snapshot(&AppSettings::default(), Some(240));
        let state = MenuState {
            can_disable_shift: shift_can_be_disabled(false, true),
            launch_at_login: false,
        };

        let items = entries(Some(&snap), state);
        assert!(ids(&items).contains(&menu::SHIFT_OFF));
        assert_eq!(
            items[0],
            MenuEntry::Label {
                id: Some(menu::PHASE),
                text: "flowing  ·  45m left".to_string(),
            }
        );
    }

    #[test]
    fn login_toggle_reflects_current_state() {
        for enabled in [false, true] {
            let state = MenuState {
                launch_at_login: enabled,
                ..MenuState::default()
            };
            let items = entries(None, state);
            assert!(items.contains(&MenuEntry::Toggle {
                id: menu::LAUNCH_AT_LOGIN,
                text: "Launch at Login",
                checked: enabled,
            }));
        }
    }

    #[test]
    fn menu_before_first_tick_has_only_app_items() {
        let items = entries(None, MenuState::default());
        assert_eq!(
            ids(&items),
            vec![menu::SHOW, menu::LAUNCH_AT_LOGIN, menu::QUIT]
        );
    }
}
