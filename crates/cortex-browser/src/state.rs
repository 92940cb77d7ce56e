use crate::nav::Navigator;
use crate::view::PanelId;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const PANEL_ORDER: [PanelId; 3] = [PanelId::Users, PanelId::Snapshots, PanelId::Snapshot];

pub struct App {
    pub navigator: Navigator,
    pub api_base: String,
    pub focus: PanelId,
    should_quit: bool,
}

impl App {
    pub fn new(navigator: Navigator, api_base: String) -> Self {
        Self {
            navigator,
            api_base,
            focus: PanelId::Users,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.navigator.view().show_help {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.navigator.view_mut().show_help = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.navigator.view_mut().show_help = true,
            KeyCode::Char('u') => {
                self.navigator.open_users();
                self.focus = PanelId::Users;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(list) = self.navigator.view_mut().list_mut(self.focus) {
                    list.select_next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(list) = self.navigator.view_mut().list_mut(self.focus) {
                    list.select_prev();
                }
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                if self.navigator.activate_selected(self.focus) {
                    self.focus = match self.focus {
                        PanelId::Users => PanelId::Snapshots,
                        PanelId::Snapshots | PanelId::Snapshot => PanelId::Snapshot,
                    };
                }
            }
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => {
                self.navigator.close_panel(self.focus);
                self.focus_previous_open();
            }
            _ => {}
        }
    }

    fn open_panels(&self) -> Vec<PanelId> {
        PANEL_ORDER
            .into_iter()
            .filter(|panel| self.navigator.view().is_open(*panel))
            .collect()
    }

    fn cycle_focus(&mut self) {
        let open = self.open_panels();
        if open.is_empty() {
            return;
        }
        let next = match open.iter().position(|panel| *panel == self.focus) {
            Some(i) => open[(i + 1) % open.len()],
            None => open[0],
        };
        self.focus = next;
    }

    fn focus_previous_open(&mut self) {
        let open = self.open_panels();
        let current = PANEL_ORDER
            .iter()
            .position(|panel| *panel == self.focus)
            .unwrap_or(0);
        self.focus = PANEL_ORDER[..current]
            .iter()
            .rev()
            .find(|panel| open.contains(panel))
            .or_else(|| open.first())
            .copied()
            .unwrap_or(PanelId::Users);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldRegistry;
    use crate::nav::NavigatorSettings;
    use crate::view::Activation;
    use cortex_core::{FetchError, Id, ResourceSource};
    use futures_util::future::BoxFuture;
    use serde_json::Value;
    use std::sync::Arc;

    struct OfflineSource;

    impl ResourceSource for OfflineSource {
        fn fetch(&self, path: String) -> BoxFuture<'static, Result<Value, FetchError>> {
            Box::pin(async move {
                Err(FetchError::Transport {
                    path,
                    message: "offline".to_string(),
                })
            })
        }
    }

    fn app() -> App {
        let (navigator, _rx) = Navigator::new(
            Arc::new(OfflineSource),
            FieldRegistry::with_defaults(),
            NavigatorSettings {
                panel_width_percent: 20,
                clear_snapshot_on_user_change: false,
            },
        );
        App::new(navigator, "http://127.0.0.1:5000".to_string())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('x')));
        assert!(!app.should_quit());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn help_captures_keys_until_dismissed() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.navigator.view().show_help);

        app.handle_key(key(KeyCode::Tab));
        assert!(app.navigator.view().show_help);
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.navigator.view().show_help);
    }

    #[test]
    fn navigation_keys_move_selection_in_focused_list() {
        let mut app = app();
        let uids: Vec<Id> = vec![Id::from(1_u64), Id::from(2_u64)];
        app.navigator.view_mut().users.render_list(
            &uids,
            |uid| uid.to_string(),
            |uid| Activation::OpenSnapshots { uid: uid.clone() },
        );

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.navigator.view().users.selected(), Some(1));
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.navigator.view().users.selected(), Some(0));
    }

    #[test]
    fn tab_cycles_through_open_panels_only() {
        let mut app = app();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, PanelId::Users);

        app.navigator.view_mut().set_panel_width(PanelId::Users, 20);
        app.navigator.view_mut().set_panel_width(PanelId::Snapshot, 100);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, PanelId::Snapshot);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, PanelId::Users);
    }

    #[test]
    fn closing_a_panel_moves_focus_back() {
        let mut app = app();
        app.navigator.view_mut().set_panel_width(PanelId::Users, 20);
        app.navigator.view_mut().set_panel_width(PanelId::Snapshots, 20);
        app.focus = PanelId::Snapshots;

        app.handle_key(key(KeyCode::Esc));
        assert!(!app.navigator.view().is_open(PanelId::Snapshots));
        assert_eq!(app.focus, PanelId::Users);
    }

    #[tokio::test]
    async fn browse_key_opens_users_panel() {
        let mut app = app();
        app.focus = PanelId::Snapshot;
        app.handle_key(key(KeyCode::Char('u')));
        assert_eq!(app.focus, PanelId::Users);
        assert_eq!(app.navigator.view().panel_width(PanelId::Users), 20);
        assert!(app.navigator.view().is_loading());
    }
}
