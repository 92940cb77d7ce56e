//! Three-level drill-down: users, a user's snapshots, one snapshot's fields.
//!
//! Every fetch runs as its own task and reports back through an mpsc channel.
//! Results are applied on the UI loop only while the ticket's epoch still
//! matches the selection it was issued for; opening a level moves the epoch of
//! that level and every deeper one, so late answers for a discarded selection
//! are dropped instead of overwriting newer state.

use crate::config::BrowserConfig;
use crate::fields::{Dispatch, FieldRegistry};
use crate::view::{Activation, PanelId, UserCard, View};
use cortex_core::{
    decode_payload, path, FetchError, Id, ResourceSource, SnapshotDetail, SnapshotSummary, User,
    UserSummary,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

pub const FETCH_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Users = 0,
    Snapshots = 1,
    Snapshot = 2,
}

const LEVELS: [Level; 3] = [Level::Users, Level::Snapshots, Level::Snapshot];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Users,
    Snapshots { uid: Id },
    UserDetail { uid: Id },
    SnapshotDetail { uid: Id, sid: Id },
    Field { uid: Id, sid: Id, name: String },
}

impl Request {
    pub fn path(&self) -> String {
        match self {
            Request::Users => path::users(),
            Request::Snapshots { uid } => path::snapshots(uid),
            Request::UserDetail { uid } => path::user(uid),
            Request::SnapshotDetail { uid, sid } => path::snapshot(uid, sid),
            Request::Field { uid, sid, name } => path::field(uid, sid, name),
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Request::Users => Level::Users,
            Request::Snapshots { .. } => Level::Snapshots,
            Request::UserDetail { .. }
            | Request::SnapshotDetail { .. }
            | Request::Field { .. } => Level::Snapshot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub epoch: u64,
    pub request: Request,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: Ticket,
    pub result: Result<Value, FetchError>,
}

#[derive(Debug, Default)]
pub struct SelectionContext {
    epochs: [u64; 3],
    uid: Option<Id>,
    snapshot: Option<(Id, Id)>,
}

impl SelectionContext {
    /// Starts a new epoch for `level` and everything below it.
    fn advance(&mut self, level: Level) -> u64 {
        for deeper in LEVELS.iter().filter(|l| **l >= level) {
            self.epochs[*deeper as usize] += 1;
        }
        match level {
            Level::Users => {
                self.uid = None;
                self.snapshot = None;
            }
            Level::Snapshots => self.snapshot = None,
            Level::Snapshot => {}
        }
        self.epochs[level as usize]
    }

    pub fn epoch(&self, level: Level) -> u64 {
        self.epochs[level as usize]
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.epoch(ticket.request.level()) == ticket.epoch
    }

    pub fn user(&self) -> Option<&Id> {
        self.uid.as_ref()
    }

    pub fn snapshot(&self) -> Option<(&Id, &Id)> {
        self.snapshot.as_ref().map(|(uid, sid)| (uid, sid))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorSettings {
    pub panel_width_percent: u16,
    pub clear_snapshot_on_user_change: bool,
}

impl From<&BrowserConfig> for NavigatorSettings {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            panel_width_percent: config.panel_width_percent,
            clear_snapshot_on_user_change: config.clear_snapshot_on_user_change,
        }
    }
}

pub struct Navigator {
    view: View,
    selection: SelectionContext,
    registry: FieldRegistry,
    source: Arc<dyn ResourceSource>,
    outcomes: mpsc::Sender<FetchOutcome>,
    settings: NavigatorSettings,
    snapshot_pending: usize,
}

impl Navigator {
    pub fn new(
        source: Arc<dyn ResourceSource>,
        registry: FieldRegistry,
        settings: NavigatorSettings,
    ) -> (Self, mpsc::Receiver<FetchOutcome>) {
        let (tx, rx) = mpsc::channel(FETCH_QUEUE_CAPACITY);
        let navigator = Self {
            view: View::default(),
            selection: SelectionContext::default(),
            registry,
            source,
            outcomes: tx,
            settings,
            snapshot_pending: 0,
        };
        (navigator, rx)
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn selection(&self) -> &SelectionContext {
        &self.selection
    }

    pub fn open_users(&mut self) {
        self.view.begin_round();
        let epoch = self.selection.advance(Level::Users);
        self.abandon_partial_snapshot();
        self.view.users.clear();
        self.spawn_fetch(epoch, Request::Users);
        self.view
            .set_panel_width(PanelId::Users, self.settings.panel_width_percent);
    }

    pub fn open_snapshots(&mut self, uid: Id) {
        self.view.begin_round();
        let epoch = self.selection.advance(Level::Snapshots);
        self.abandon_partial_snapshot();
        if self.settings.clear_snapshot_on_user_change
            && self
                .view
                .shown_snapshot
                .as_ref()
                .is_some_and(|(shown, _)| *shown != uid)
        {
            self.view.close_snapshot();
        }
        self.selection.uid = Some(uid.clone());
        self.view.snapshots.clear();
        self.spawn_fetch(epoch, Request::Snapshots { uid });
        self.view
            .set_panel_width(PanelId::Snapshots, self.settings.panel_width_percent);
    }

    /// Fires the user and snapshot detail fetches side by side. Slots of the
    /// previously shown snapshot are cleared so fields it had do not linger.
    pub fn open_snapshot(&mut self, uid: Id, sid: Id) {
        self.view.begin_round();
        let epoch = self.selection.advance(Level::Snapshot);
        self.snapshot_pending = 0;
        self.view.clear_snapshot();
        self.selection.uid = Some(uid.clone());
        self.selection.snapshot = Some((uid.clone(), sid.clone()));
        self.view.shown_snapshot = Some((uid.clone(), sid.clone()));
        info!(uid = %uid, sid = %sid, "open_snapshot");

        self.spawn_fetch(epoch, Request::UserDetail { uid: uid.clone() });
        self.spawn_fetch(epoch, Request::SnapshotDetail { uid, sid });
        self.view.set_panel_width(PanelId::Snapshot, 100);
    }

    /// Runs the action bound to the entry at `index`; false when there is none.
    pub fn activate(&mut self, panel: PanelId, index: usize) -> bool {
        let action = match self.view.list(panel).and_then(|list| list.action(index)) {
            Some(action) => action.clone(),
            None => return false,
        };
        self.run(action);
        true
    }

    pub fn activate_selected(&mut self, panel: PanelId) -> bool {
        match self.view.list(panel).and_then(|list| list.selected()) {
            Some(index) => self.activate(panel, index),
            None => false,
        }
    }

    pub fn close_panel(&mut self, panel: PanelId) {
        self.view.set_panel_width(panel, 0);
    }

    /// Reopening a shallower level drops the snapshot's outstanding fetches.
    /// A snapshot that was still loading then can never complete, so its
    /// panel is closed instead of left half drawn. A fully loaded snapshot
    /// stays on screen.
    fn abandon_partial_snapshot(&mut self) {
        if self.snapshot_pending > 0 {
            debug!(pending = self.snapshot_pending, "closing partially loaded snapshot");
            self.snapshot_pending = 0;
            self.view.close_snapshot();
        }
    }

    fn run(&mut self, action: Activation) {
        match action {
            Activation::OpenSnapshots { uid } => self.open_snapshots(uid),
            Activation::OpenSnapshot { uid, sid } => self.open_snapshot(uid, sid),
        }
    }

    fn spawn_fetch(&mut self, epoch: u64, request: Request) {
        let path = request.path();
        debug!(%path, epoch, "spawn_fetch");
        self.view.begin_fetch();
        if request.level() == Level::Snapshot {
            self.snapshot_pending += 1;
        }

        let source = Arc::clone(&self.source);
        let tx = self.outcomes.clone();
        let ticket = Ticket { epoch, request };
        tokio::spawn(async move {
            let result = source.fetch(path).await;
            let _ = tx.send(FetchOutcome { ticket, result }).await;
        });
    }

    pub fn apply(&mut self, outcome: FetchOutcome) {
        self.view.finish_fetch();
        let FetchOutcome { ticket, result } = outcome;
        let path = ticket.request.path();

        if !self.selection.is_current(&ticket) {
            debug!(%path, epoch = ticket.epoch, "dropping stale fetch result");
            return;
        }
        if ticket.request.level() == Level::Snapshot {
            self.snapshot_pending = self.snapshot_pending.saturating_sub(1);
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%path, not_found = err.is_not_found(), error = %err, "fetch_failed");
                self.view.report_error(&path, err.to_string());
                return;
            }
        };

        if let Err(err) = self.render(ticket, &path, payload) {
            warn!(%path, error = %err, "render_failed");
            self.view.report_error(&path, err);
        }
    }

    fn render(&mut self, ticket: Ticket, path: &str, payload: Value) -> Result<(), String> {
        let epoch = ticket.epoch;
        match ticket.request {
            Request::Users => {
                let users: Vec<UserSummary> =
                    decode_payload(path, payload).map_err(|err| err.to_string())?;
                self.view.users.render_list(
                    &users,
                    |user| user.name.clone(),
                    |user| Activation::OpenSnapshots {
                        uid: user.uid.clone(),
                    },
                );
            }
            Request::Snapshots { uid } => {
                let snapshots: Vec<SnapshotSummary> =
                    decode_payload(path, payload).map_err(|err| err.to_string())?;
                self.view.snapshots.render_list(
                    &snapshots,
                    |snapshot| snapshot.datetime.to_string(),
                    |snapshot| Activation::OpenSnapshot {
                        uid: uid.clone(),
                        sid: snapshot.id.clone(),
                    },
                );
            }
            Request::UserDetail { .. } => {
                let user: User = decode_payload(path, payload).map_err(|err| err.to_string())?;
                self.view.user_card = Some(UserCard::from(&user));
            }
            Request::SnapshotDetail { uid, sid } => {
                let detail: SnapshotDetail =
                    decode_payload(path, payload).map_err(|err| err.to_string())?;
                for name in detail.fields {
                    self.render_field(epoch, uid.clone(), sid.clone(), name);
                }
            }
            Request::Field { name, .. } => {
                match self
                    .registry
                    .dispatch(&name, &payload, &mut self.view)
                    .map_err(|err| err.to_string())?
                {
                    Dispatch::Rendered => trace!(field = %name, "field rendered"),
                    Dispatch::Ignored => trace!(field = %name, "field ignored"),
                }
            }
        }
        Ok(())
    }

    /// Fetches one field; its result is dispatched on arrival, independent of siblings.
    fn render_field(&mut self, epoch: u64, uid: Id, sid: Id, name: String) {
        self.spawn_fetch(epoch, Request::Field { uid, sid, name });
    }
}
