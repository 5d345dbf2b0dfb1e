//! Session store — one context / interview log / interview state / coach chat
//! bundle per client session.
//!
//! Each session sits behind its own async mutex. A turn holds that mutex from
//! transcription to commit, so turns of one session never interleave while
//! separate sessions run in parallel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::interview::controller::TurnOutcome;
use crate::interview::models::{ConversationLog, InterviewState, SessionContext};

#[derive(Debug, Clone)]
pub struct Session {
    pub context: SessionContext,
    pub log: ConversationLog,
    pub state: InterviewState,
    /// Free-form chat with the recruiter coach. Separate from the interview log.
    pub coach_log: ConversationLog,
    last_active: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            context: SessionContext::default(),
            log: ConversationLog::default(),
            state: InterviewState::default(),
            coach_log: ConversationLog::default(),
            last_active: Instant::now(),
        }
    }
}

impl Session {
    /// Replaces the context wholesale, restarts the interview and drops the
    /// coach chat, which was grounded on the old context.
    pub fn set_context(&mut self, context: SessionContext) {
        self.context = context;
        self.coach_log = ConversationLog::default();
        self.reset_conversation();
    }

    /// Clears the log and interview state; the context is kept.
    pub fn reset_conversation(&mut self) {
        self.log = ConversationLog::default();
        self.state = InterviewState::default();
        self.touch();
    }

    /// Applies the result of a completed turn.
    pub fn commit(&mut self, outcome: TurnOutcome) {
        self.log = outcome.log;
        self.state = outcome.state;
        self.touch();
    }

    /// Replaces the coach chat after a completed exchange.
    pub fn commit_coach(&mut self, coach_log: ConversationLog) {
        self.coach_log = coach_log;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_active)
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session seeded with `context` and returns its id.
    pub fn create(&self, context: SessionContext) -> Uuid {
        let id = Uuid::new_v4();
        let mut session = Session::default();
        session.set_context(context);
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        info!("Created interview session {id}");
        id
    }

    /// Returns the session for `id`, creating an empty one on first use.
    pub fn handle(&self, id: Uuid) -> SessionHandle {
        self.sessions
            .entry(id)
            .or_insert_with(|| {
                debug!("Opening empty interview session {id}");
                Arc::new(Mutex::new(Session::default()))
            })
            .clone()
    }

    /// Looks up an existing session without creating one.
    pub fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Drops sessions idle for at least `max_idle`. Sessions whose lock is held
    /// are in the middle of a turn and are always kept.
    pub fn evict_idle(&self, max_idle: Duration, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, handle| match handle.try_lock() {
            Ok(session) => {
                let keep = session.idle_for(now) < max_idle;
                if !keep {
                    debug!("Evicting idle interview session {id}");
                }
                keep
            }
            Err(_) => true,
        });
        before.saturating_sub(self.sessions.len())
    }
}
