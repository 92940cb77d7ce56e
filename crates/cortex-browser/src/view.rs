use crate::list::ListContainer;
use crate::theme::icons;
use chrono::{DateTime, Local};
use cortex_core::{format_metric, Feelings, Gender, Id, ImageRef, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Users,
    Snapshots,
    Snapshot,
}

impl PanelId {
    pub fn title(self) -> &'static str {
        match self {
            PanelId::Users => "Users",
            PanelId::Snapshots => "Snapshots",
            PanelId::Snapshot => "Snapshot",
        }
    }
}

/// What activating a rendered list entry does next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    OpenSnapshots { uid: Id },
    OpenSnapshot { uid: Id, sid: Id },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCard {
    pub name: String,
    pub gender: Gender,
    pub birthday: String,
}

impl UserCard {
    pub fn icon(&self) -> &'static str {
        match self.gender {
            Gender::Male => icons::MALE,
            Gender::Female => icons::FEMALE,
        }
    }
}

impl From<&User> for UserCard {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            gender: user.gender,
            birthday: user.birthday.clone(),
        }
    }
}

/// Display slots for the feelings field, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeelingsSlots {
    pub hunger: String,
    pub thirst: String,
    pub exhaustion: String,
    pub happiness: String,
}

impl From<&Feelings> for FeelingsSlots {
    fn from(feelings: &Feelings) -> Self {
        Self {
            hunger: format_metric(feelings.hunger),
            thirst: format_metric(feelings.thirst),
            exhaustion: format_metric(feelings.exhaustion),
            happiness: format_metric(feelings.happiness),
        }
    }
}

impl FeelingsSlots {
    pub fn rows(&self) -> [(&'static str, &str); 4] {
        [
            ("Hunger", &self.hunger),
            ("Thirst", &self.thirst),
            ("Exhaustion", &self.exhaustion),
            ("Happiness", &self.happiness),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Loaded {
        at: DateTime<Local>,
    },
    Error {
        path: String,
        message: String,
        at: DateTime<Local>,
    },
}

/// In-memory UI tree drawn by the terminal renderer every frame.
#[derive(Debug, Default)]
pub struct View {
    pub users: ListContainer<Activation>,
    pub snapshots: ListContainer<Activation>,
    pub users_width: u16,
    pub snapshots_width: u16,
    pub snapshot_open: bool,
    /// `(uid, sid)` of the snapshot whose slots are on screen.
    pub shown_snapshot: Option<(Id, Id)>,
    pub user_card: Option<UserCard>,
    pub feelings: Option<FeelingsSlots>,
    pub background: Option<ImageRef>,
    pub status: Status,
    pub in_flight: usize,
    pub show_help: bool,
}

impl View {
    pub fn list(&self, panel: PanelId) -> Option<&ListContainer<Activation>> {
        match panel {
            PanelId::Users => Some(&self.users),
            PanelId::Snapshots => Some(&self.snapshots),
            PanelId::Snapshot => None,
        }
    }

    pub fn list_mut(&mut self, panel: PanelId) -> Option<&mut ListContainer<Activation>> {
        match panel {
            PanelId::Users => Some(&mut self.users),
            PanelId::Snapshots => Some(&mut self.snapshots),
            PanelId::Snapshot => None,
        }
    }

    pub fn panel_width(&self, panel: PanelId) -> u16 {
        match panel {
            PanelId::Users => self.users_width,
            PanelId::Snapshots => self.snapshots_width,
            PanelId::Snapshot => {
                if self.snapshot_open {
                    100u16.saturating_sub(self.users_width + self.snapshots_width)
                } else {
                    0
                }
            }
        }
    }

    pub fn set_panel_width(&mut self, panel: PanelId, width_percent: u16) {
        let width = width_percent.min(100);
        match panel {
            PanelId::Users => self.users_width = width,
            PanelId::Snapshots => self.snapshots_width = width,
            PanelId::Snapshot => self.snapshot_open = width > 0,
        }
    }

    pub fn is_open(&self, panel: PanelId) -> bool {
        match panel {
            PanelId::Snapshot => self.snapshot_open,
            _ => self.panel_width(panel) > 0,
        }
    }

    pub fn clear_snapshot(&mut self) {
        self.shown_snapshot = None;
        self.user_card = None;
        self.feelings = None;
        self.background = None;
    }

    pub fn close_snapshot(&mut self) {
        self.clear_snapshot();
        self.snapshot_open = false;
    }

    /// Starts a new operator action; an error from an earlier one is dropped.
    pub fn begin_round(&mut self) {
        if matches!(self.status, Status::Error { .. }) {
            self.status = Status::Idle;
        }
    }

    /// Errors stay visible for the rest of the round, including fetches it fans out.
    pub fn begin_fetch(&mut self) {
        if !matches!(self.status, Status::Error { .. }) {
            self.status = Status::Loading;
        }
        self.in_flight += 1;
    }

    pub fn finish_fetch(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 && self.status == Status::Loading {
            self.status = Status::Loaded { at: Local::now() };
        }
    }

    pub fn report_error(&mut self, path: &str, message: impl Into<String>) {
        self.status = Status::Error {
            path: path.to_string(),
            message: message.into(),
            at: Local::now(),
        };
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}
