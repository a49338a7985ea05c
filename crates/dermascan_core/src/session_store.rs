//! crates/dermascan_core/src/session_store.rs
//!
//! The single source of truth for "who is signed in".
//!
//! The store owns the `user` and `users` storage keys. Login and signup model a
//! round-trip to a remote authority: they wait out a configurable latency, and
//! only one of them may be pending at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::credentials::{hash_password, verify_password};
use crate::domain::{RegisteredUser, Session};
use crate::error::SessionError;
use crate::in_flight::InFlight;
use crate::persistence::{read_json, write_json, SESSION_KEY, USERS_KEY};
use crate::ports::{KeyValueStore, PortError};

/// Simulated round-trip for login and signup.
pub const DEFAULT_AUTH_LATENCY: Duration = Duration::from_millis(1000);

/// What the store currently knows about the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Rehydration from storage has not completed yet.
    Unknown,
    SignedOut,
    SignedIn(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AuthState::Unknown)
    }
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<AuthState>,
    pending: AtomicBool,
    /// Bumped by every logout; a request that started under an older value is discarded.
    generation: Mutex<u64>,
    latency: Duration,
}

impl SessionStore {
    /// Creates a store in the `Unknown` state. Call `rehydrate` to load the persisted session.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            storage,
            state,
            pending: AtomicBool::new(false),
            generation: Mutex::new(0),
            latency: DEFAULT_AUTH_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Creates a store and rehydrates it in one step.
    pub async fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self, SessionError> {
        let store = Self::new(storage);
        store.rehydrate().await?;
        Ok(store)
    }

    /// Loads the persisted session, if any, and publishes it.
    ///
    /// An unreadable session document is treated as signed out.
    pub async fn rehydrate(&self) -> Result<(), SessionError> {
        let restored = match read_json::<Session>(self.storage.as_ref(), SESSION_KEY).await {
            Ok(restored) => restored,
            Err(PortError::Serialization(e)) => {
                warn!("Ignoring unreadable persisted session: {}", e);
                None
            }
            Err(e) => return Err(e.into()),
        };

        match restored {
            Some(session) => {
                debug!("Restored session for {}", session.email);
                self.state.send_replace(AuthState::SignedIn(session));
            }
            None => {
                self.state.send_replace(AuthState::SignedOut);
            }
        }
        Ok(())
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// True while the session is not yet known or a login/signup is pending.
    pub fn is_loading(&self) -> bool {
        self.pending.load(Ordering::Acquire) || !self.state.borrow().is_known()
    }

    /// Observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let _pending = InFlight::try_acquire(&self.pending).ok_or(SessionError::Busy)?;
        let started = *self.generation.lock().await;
        self.round_trip().await;

        let ledger = self.load_ledger().await?;
        let user = ledger
            .iter()
            .find(|user| user.email == email)
            .ok_or(SessionError::Authentication)?;

        if !verify_password(password, &user.password_hash)? {
            warn!("Rejected login for {}", email);
            return Err(SessionError::Authentication);
        }

        let generation = self.generation.lock().await;
        if *generation != started {
            debug!("Discarding login for {}: signed out while pending", email);
            return Err(SessionError::Superseded);
        }
        let session = user.session();
        self.establish(&session).await?;
        info!("User {} signed in", session.email);
        Ok(session)
    }

    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let _pending = InFlight::try_acquire(&self.pending).ok_or(SessionError::Busy)?;
        let started = *self.generation.lock().await;
        self.round_trip().await;
        let password_hash = hash_password(password)?;

        let generation = self.generation.lock().await;
        if *generation != started {
            debug!("Discarding signup for {}: signed out while pending", email);
            return Err(SessionError::Superseded);
        }

        let mut ledger = self.load_ledger().await?;
        if ledger.iter().any(|user| user.email == email) {
            return Err(SessionError::DuplicateAccount(email.to_string()));
        }

        let user = RegisteredUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };
        let session = user.session();
        ledger.push(user);
        write_json(self.storage.as_ref(), USERS_KEY, &ledger).await?;

        if let Err(e) = self.establish(&session).await {
            // The account only exists if the sign-in went through too.
            ledger.pop();
            if let Err(rollback) = write_json(self.storage.as_ref(), USERS_KEY, &ledger).await {
                warn!("Could not roll back account {}: {}", email, rollback);
            }
            return Err(e);
        }
        drop(generation);

        info!("Registered account {} ({})", session.username, session.email);
        Ok(session)
    }

    /// Clears the session from storage and memory. A no-op when signed out.
    ///
    /// A login or signup still waiting on its round trip is discarded.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let mut generation = self.generation.lock().await;
        *generation = generation.wrapping_add(1);

        self.storage.delete(SESSION_KEY).await?;
        if let Some(session) = self.current_session() {
            info!("User {} signed out", session.email);
        }
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn load_ledger(&self) -> Result<Vec<RegisteredUser>, SessionError> {
        Ok(read_json(self.storage.as_ref(), USERS_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Persists first, then publishes, so a failed write leaves the previous state intact.
    /// Callers hold the generation lock.
    async fn establish(&self, session: &Session) -> Result<(), SessionError> {
        write_json(self.storage.as_ref(), SESSION_KEY, session).await?;
        self.state.send_replace(AuthState::SignedIn(session.clone()));
        Ok(())
    }
}
