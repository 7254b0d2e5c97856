use crate::clock::SystemClock;
use crate::constants;
use crate::display::tray_title;
use crate::settings::{AppSettings, SettingsManager};
use crate::shift::{ShiftConfig, ShiftPreview, ShiftStore, TimeOfDay};
use crate::store::FileStore;
use crate::ticker::{Snapshot, Ticker};
use crate::tray_menu::{self, MenuEntry, MenuState};
use log::{info, warn};
use std::sync::Arc;
use tauri::{
    AppHandle, Emitter, Manager, State,
    async_runtime::JoinHandle,
    image::Image,
    menu::{CheckMenuItemBuilder, MenuBuilder, MenuItemBuilder},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
};
use tauri_plugin_autostart::{MacosLauncher, ManagerExt};
use tokio::sync::Mutex;

pub struct AppState {
    settings_manager: SettingsManager,
    shifts: ShiftStore<FileStore>,
    settings: Mutex<AppSettings>,
    snapshot: std::sync::Mutex<Option<Snapshot>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

/// Settings the tray needs on every tick, captured when the poller starts.
#[derive(Debug, Clone, Copy)]
struct TrayPrefs {
    show_percent_symbol: bool,
    pinned: bool,
}

fn parse_wake(value: &str) -> Result<TimeOfDay, String> {
    value.parse::<TimeOfDay>().map_err(|e| e.to_string())
}

#[tauri::command]
async fn get_snapshot(state: State<'_, Arc<AppState>>) -> Result<Option<Snapshot>, String> {
    let snapshot = state.snapshot.lock().map_err(|e| e.to_string())?;
    Ok(snapshot.clone())
}

#[tauri::command]
async fn get_shift_config(state: State<'_, Arc<AppState>>) -> Result<Option<ShiftConfig>, String> {
    Ok(state.shifts.load())
}

#[tauri::command]
async fn preview_shift(actual_wake: String, ideal_wake: String) -> Result<ShiftPreview, String> {
    let actual = parse_wake(&actual_wake)?;
    let ideal = parse_wake(&ideal_wake)?;
    Ok(ShiftPreview::new(actual, ideal))
}

/// Returns the record as it now reads back, so a failed write shows up as
/// the shift still being off.
#[tauri::command]
async fn start_shift(
    state: State<'_, Arc<AppState>>,
    actual_wake: String,
    ideal_wake: String,
) -> Result<Option<ShiftConfig>, String> {
    let actual = parse_wake(&actual_wake)?;
    let ideal = parse_wake(&ideal_wake)?;

    state.shifts.save_config(&ShiftConfig::new(actual, ideal, true));
    Ok(state.shifts.load())
}

#[tauri::command]
async fn disable_shift(state: State<'_, Arc<AppState>>) -> Result<Option<ShiftConfig>, String> {
    state.shifts.disable();
    Ok(state.shifts.load())
}

#[tauri::command]
async fn get_settings(state: State<'_, Arc<AppState>>) -> Result<AppSettings, String> {
    let settings = state.settings.lock().await;
    Ok(settings.clone())
}

#[tauri::command]
async fn save_settings(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    new_settings: AppSettings,
) -> Result<(), String> {
    state.settings_manager.save(&new_settings).map_err(|e| e.to_string())?;

    {
        let mut settings = state.settings.lock().await;
        *settings = new_settings;
    }

    // force a tray rebuild on the next tick
    if let Ok(mut last) = state.snapshot.lock() {
        *last = None;
    }

    start_poller(&app, &state).await;
    Ok(())
}

fn on_tick(app: &AppHandle, state: &AppState, snapshot: &Snapshot, prefs: TrayPrefs) {
    let changed = {
        let Ok(mut last) = state.snapshot.lock() else {
            return;
        };
        let changed = last.as_ref().is_none_or(|prev| {
            prev.display_percent != snapshot.display_percent
                || prev.remaining_minutes != snapshot.remaining_minutes
                || prev.offset_minutes != snapshot.offset_minutes
        });
        *last = Some(snapshot.clone());
        changed
    };

    if changed {
        update_tray(app, state, snapshot, prefs);
    }

    let _ = app.emit(constants::TICK_EVENT, snapshot);
}

fn update_tray(app: &AppHandle, state: &AppState, snapshot: &Snapshot, prefs: TrayPrefs) {
    if let Some(tray) = app.tray_by_id(constants::TRAY_ID) {
        let title = tray_title(Some(snapshot.display_percent), prefs.show_percent_symbol);
        let _ = tray.set_title(Some(&title));

        let menu_state = MenuState {
            can_disable_shift: tray_menu::shift_can_be_disabled(
                prefs.pinned,
                state.shifts.is_active(),
            ),
            launch_at_login: launch_at_login(app),
        };
        if let Ok(menu) = create_tray_menu(app, Some(snapshot), menu_state) {
            let _ = tray.set_menu(Some(menu));
        }
    }
}

fn launch_at_login(app: &AppHandle) -> bool {
    app.autolaunch().is_enabled().unwrap_or_else(|e| {
        warn!("Failed to read login item state: {e}");
        false
    })
}

fn toggle_launch_at_login(app: &AppHandle) {
    let autolaunch = app.autolaunch();
    let result = if launch_at_login(app) {
        autolaunch.disable()
    } else {
        autolaunch.enable()
    };

    match result {
        Ok(()) => info!("Launch at login: {}", launch_at_login(app)),
        Err(e) => warn!("Failed to change login item: {e}"),
    }
}

fn create_tray_menu(
    app: &AppHandle,
    snapshot: Option<&Snapshot>,
    state: MenuState,
) -> tauri::Result<tauri::menu::Menu<tauri::Wry>> {
    let mut builder = MenuBuilder::new(app);

    for entry in tray_menu::entries(snapshot, state) {
        builder = match entry {
            MenuEntry::Label { id: Some(id), text } => {
                builder.item(&MenuItemBuilder::with_id(id, text).enabled(false).build(app)?)
            }
            MenuEntry::Label { id: None, text } => {
                builder.item(&MenuItemBuilder::new(text).enabled(false).build(app)?)
            }
            MenuEntry::Action { id, text } => {
                builder.item(&MenuItemBuilder::with_id(id, text).build(app)?)
            }
            MenuEntry::Toggle { id, text, checked } => builder.item(
                &CheckMenuItemBuilder::with_id(id, text)
                    .checked(checked)
                    .build(app)?,
            ),
            MenuEntry::Separator => builder.separator(),
        };
    }

    builder.build()
}

fn toggle_main_window(app: &AppHandle) {
    if let Some(window) = app.get_webview_window("main") {
        if window.is_visible().unwrap_or(false) {
            let _ = window.hide();
        } else {
            let _ = window.show();
            let _ = window.set_focus();
        }
    }
}

/// (Re)starts the poll loop with the current settings, aborting any loop
/// already running.
async fn start_poller(app: &AppHandle, state: &Arc<AppState>) {
    let settings = state.settings.lock().await.clone();
    let ticker = Ticker::new(SystemClock, state.shifts.clone(), &settings);
    let period = settings.tick_interval();
    let prefs = TrayPrefs {
        show_percent_symbol: settings.show_percent_symbol,
        pinned: settings.pinned_shift.is_some(),
    };

    let app_handle = app.clone();
    let state_clone = state.clone();
    let handle = tauri::async_runtime::spawn(ticker.run(period, move |snapshot| {
        on_tick(&app_handle, &state_clone, &snapshot, prefs);
    }));

    if let Some(previous) = state.poller.lock().await.replace(handle) {
        previous.abort();
    }
    info!("Polling every {}ms", period.as_millis());
}

async fn stop_poller(state: &Arc<AppState>) {
    if let Some(handle) = state.poller.lock().await.take() {
        handle.abort();
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Centi·Hour starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_autostart::init(MacosLauncher::LaunchAgent, None))
        .setup(|app| {
            let store = FileStore::in_config_dir();
            let settings_manager = SettingsManager::new(store.clone());
            let initial_settings = settings_manager.load().unwrap_or_else(|e| {
                warn!("Falling back to default settings: {e:#}");
                AppSettings::default()
            });

            let state = Arc::new(AppState {
                settings_manager,
                shifts: ShiftStore::new(store),
                settings: Mutex::new(initial_settings),
                snapshot: std::sync::Mutex::new(None),
                poller: Mutex::new(None),
            });

            app.manage(state.clone());

            let menu_state = MenuState {
                can_disable_shift: false,
                launch_at_login: launch_at_login(app.handle()),
            };
            let menu = create_tray_menu(app.handle(), None, menu_state)?;

            // 1x1 transparent icon: the slot exists but only the title shows.
            let icon = Image::new_owned(vec![0; 4], 1, 1);

            let _tray = TrayIconBuilder::with_id(constants::TRAY_ID)
                .icon(icon)
                .title(constants::TRAY_TITLE_DEFAULT)
                .menu(&menu)
                .show_menu_on_left_click(false)
                .on_menu_event(move |app, event| match event.id().as_ref() {
                    constants::menu::SHIFT_OFF => {
                        let state = app.state::<Arc<AppState>>();
                        state.shifts.disable();
                    }
                    constants::menu::LAUNCH_AT_LOGIN => toggle_launch_at_login(app),
                    constants::menu::SHOW => {
                        if let Some(window) = app.get_webview_window("main") {
                            let _ = window.show();
                            let _ = window.set_focus();
                        }
                    }
                    constants::menu::QUIT => {
                        let app = app.clone();
                        tauri::async_runtime::spawn(async move {
                            let state = app.state::<Arc<AppState>>().inner().clone();
                            stop_poller(&state).await;
                            app.exit(0);
                        });
                    }
                    _ => {}
                })
                .on_tray_icon_event(|tray, event| {
                    if let TrayIconEvent::Click {
                        button: MouseButton::Left,
                        button_state: MouseButtonState::Up,
                        ..
                    } = event
                    {
                        toggle_main_window(tray.app_handle());
                    }
                })
                .build(app)?;

            #[cfg(target_os = "macos")]
            {
                app.set_activation_policy(tauri::ActivationPolicy::Accessory);
            }

            let app_handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                start_poller(&app_handle, &state).await;
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_snapshot,
            get_shift_config,
            preview_shift,
            start_shift,
            disable_shift,
            get_settings,
            save_settings
        ])
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                let _ = window.hide();
                api.prevent_close();
            }
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
