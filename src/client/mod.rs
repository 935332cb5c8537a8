//! Client-side board session.
//!
//! [`BoardClient`] owns the process-scoped state of one signed-in user: the
//! optimistic board store, the toast queue and the inactivity monitor. All
//! of it is created when the client is built and torn down on logout.
//! Timers are deadlines; [`driver::drive`] is the event loop that sleeps
//! until the next one and calls [`BoardClient::tick`].

pub mod driver;
pub mod session;
pub mod throttle;
pub mod timer;
pub mod toasts;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, broadcast};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::io::remote::RemoteBoard;
use crate::model::board::BoardState;
use crate::model::config::{SessionConfig, Settings};
use crate::model::member::{MemberId, MemberUpdate};
use crate::model::task::{TaskId, TaskStatus};
use crate::model::toast::{NewToast, Toast, ToastId};
use crate::ops::optimistic::{OptimisticController, Outcome};
use crate::ops::{BoardError, member_ops, task_ops};

pub use session::{ActivityKind, SessionMonitor, SessionSignal};
pub use toasts::ToastQueue;

const SIGNAL_CAPACITY: usize = 16;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user signed out
    User,
    /// The inactivity timeout elapsed
    Inactivity,
    /// The server stopped accepting the session's credential
    Unauthenticated,
}

/// Broadcast to UI subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSignal {
    SessionWarning { remaining: Duration },
    LoggedOut { reason: LogoutReason },
}

pub struct BoardClient {
    remote: Arc<dyn RemoteBoard>,
    board: OptimisticController<BoardState>,
    toasts: Mutex<ToastQueue>,
    session: Mutex<SessionMonitor>,
    signals: broadcast::Sender<ClientSignal>,
    reschedule: Notify,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BoardClient {
    pub fn new(settings: Settings, remote: Arc<dyn RemoteBoard>) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        BoardClient {
            remote,
            board: OptimisticController::new(BoardState::default()),
            toasts: Mutex::new(ToastQueue::new(settings.toasts)),
            session: Mutex::new(SessionMonitor::new(settings.session)),
            signals,
            reschedule: Notify::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Start an authenticated session on `board` (as loaded from the server)
    pub fn login(&self, board: BoardState) {
        self.board.replace(board);
        lock(&self.session).start(Instant::now());
        self.reschedule.notify_one();
    }

    /// User-initiated sign out
    pub fn logout(&self) {
        self.end_session(LogoutReason::User);
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.session).is_active()
    }

    /// Settings source changed the timeout
    pub fn set_session_config(&self, config: SessionConfig) {
        lock(&self.session).update_config(config, Instant::now());
        self.reschedule.notify_one();
    }

    /// Feed one user input event. Returns true if it reset the session timers.
    pub fn record_activity(&self, kind: ActivityKind) -> bool {
        let reset = lock(&self.session).record_activity(kind, Instant::now());
        if reset {
            self.reschedule.notify_one();
        }
        reset
    }

    /// Fire due deadlines: purge expired toasts, emit the session warning,
    /// force the logout.
    pub fn tick(&self) {
        let now = Instant::now();
        lock(&self.toasts).expire(now);
        let signals = lock(&self.session).poll(now);
        for signal in signals {
            match signal {
                SessionSignal::Warning { remaining } => {
                    let _ = self.signals.send(ClientSignal::SessionWarning { remaining });
                }
                SessionSignal::Expired => self.end_session(LogoutReason::Inactivity),
            }
        }
    }

    /// Earliest toast or session deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        let toasts = lock(&self.toasts).next_deadline();
        let session = lock(&self.session).next_deadline();
        timer::earliest(toasts, session)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientSignal> {
        self.signals.subscribe()
    }

    fn end_session(&self, reason: LogoutReason) {
        info!(?reason, "ending session");
        self.board.abandon_in_flight();
        self.board.replace(BoardState::default());
        let timeout_minutes = {
            let mut session = lock(&self.session);
            session.stop();
            session.config().timeout_minutes
        };
        {
            let mut toasts = lock(&self.toasts);
            toasts.clear();
            match reason {
                LogoutReason::User => {}
                LogoutReason::Inactivity => {
                    toasts.enqueue(NewToast::warning("Session expired").message(format!(
                        "You were signed out after {timeout_minutes} minutes of inactivity."
                    )));
                }
                LogoutReason::Unauthenticated => {
                    toasts.enqueue(
                        NewToast::warning("Session ended").message("Please sign in again."),
                    );
                }
            }
        }
        let _ = self.signals.send(ClientSignal::LoggedOut { reason });
        self.reschedule.notify_one();
    }

    // -----------------------------------------------------------------------
    // Optimistic mutations
    // -----------------------------------------------------------------------

    /// Move a task to another column; the board reflects it immediately
    pub async fn move_task(&self, id: TaskId, status: TaskStatus) -> Result<Outcome, BoardError> {
        let result = task_ops::move_task(&self.board, self.remote.as_ref(), id, status).await;
        self.after_mutation(result)
    }

    pub async fn update_member(&self, id: MemberId, update: MemberUpdate) -> Result<Outcome, BoardError> {
        let result = member_ops::update_member(&self.board, self.remote.as_ref(), id, update).await;
        self.after_mutation(result)
    }

    pub async fn remove_member(&self, id: MemberId) -> Result<Outcome, BoardError> {
        let result = member_ops::remove_member(&self.board, self.remote.as_ref(), id).await;
        self.after_mutation(result)
    }

    fn after_mutation(&self, result: Result<Outcome, BoardError>) -> Result<Outcome, BoardError> {
        if let Err(err) = &result
            && err.is_authentication()
        {
            warn!("server rejected the session credential");
            self.end_session(LogoutReason::Unauthenticated);
        }
        result
    }

    /// Read the local board
    pub fn board<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        self.board.read(f)
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    pub fn notify(&self, toast: NewToast) -> ToastId {
        let id = lock(&self.toasts).enqueue(toast);
        self.reschedule.notify_one();
        id
    }

    /// Surface a failed mutation as an error toast
    pub fn report(&self, title: &str, err: &BoardError) -> ToastId {
        let id = lock(&self.toasts).enqueue_error(title, err);
        self.reschedule.notify_one();
        id
    }

    pub fn dismiss(&self, id: ToastId) -> bool {
        lock(&self.toasts).dismiss(id)
    }

    pub fn clear_toasts(&self) {
        lock(&self.toasts).clear();
    }

    /// Toasts currently on screen, oldest first
    pub fn toasts(&self) -> Vec<Toast> {
        lock(&self.toasts)
            .visible(Instant::now())
            .cloned()
            .collect()
    }
}
