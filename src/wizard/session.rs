//! Shared session handles.
//!
//! A handle owns its state behind a `std::sync::Mutex`. Generator calls run
//! with the lock released: lock to begin, await, lock again to finish.
//! A call dropped mid-await releases its in-flight slot through
//! [`PendingCall`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::controller::{Ticket, Wizard};
use super::error::{WizardError, WizardResult};
use super::scope::ScopeWizard;
use crate::llm::Generator;
use crate::models::{Brief, DimensionInput, ScopeView, WizardView};

/// Sessions untouched for this long are dropped on the next `create`.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Holds a ticket while its generator call is awaited. If the future is
/// dropped before [`PendingCall::into_ticket`], the slot is abandoned.
struct PendingCall<T> {
    inner: Arc<Mutex<T>>,
    ticket: Option<Ticket>,
    release: fn(&mut T, &Ticket),
}

impl<T> PendingCall<T> {
    fn new(inner: &Arc<Mutex<T>>, ticket: Ticket, release: fn(&mut T, &Ticket)) -> Self {
        Self {
            inner: inner.clone(),
            ticket: Some(ticket),
            release,
        }
    }

    fn into_ticket(mut self) -> Ticket {
        self.ticket.take().expect("pending call already settled")
    }
}

impl<T> Drop for PendingCall<T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            // A poisoned lock has nothing left worth releasing
            if let Ok(mut state) = self.inner.lock() {
                (self.release)(&mut *state, &ticket);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WizardHandle {
    inner: Arc<Mutex<Wizard>>,
}

impl WizardHandle {
    pub fn new(wizard: Wizard) -> Self {
        Self {
            inner: Arc::new(Mutex::new(wizard)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.lock().id()
    }

    pub fn view(&self) -> WizardView {
        self.lock().view()
    }

    pub fn brief(&self) -> WizardResult<Brief> {
        self.lock().brief()
    }

    /// Run a synchronous transaction and return the resulting view.
    pub fn update<F>(&self, f: F) -> WizardResult<WizardView>
    where
        F: FnOnce(&mut Wizard) -> WizardResult<()>,
    {
        let mut wizard = self.lock();
        f(&mut wizard)?;
        Ok(wizard.view())
    }

    pub async fn submit_idea(&self, generator: &dyn Generator, idea: &str) -> WizardResult<WizardView> {
        let (pending, id) = {
            let mut wizard = self.lock();
            let ticket = wizard.begin_submit_idea(idea)?;
            (PendingCall::new(&self.inner, ticket, Wizard::abandon), wizard.id())
        };
        tracing::info!("Generating agenda for wizard {}", id);

        let result = generator.generate_agenda(idea.trim()).await;

        let ticket = pending.into_ticket();
        let mut wizard = self.lock();
        wizard.finish_submit_idea(ticket, idea, result)?;
        Ok(wizard.view())
    }

    pub async fn load_options(
        &self,
        generator: &dyn Generator,
        extra_context: Option<String>,
    ) -> WizardResult<WizardView> {
        let (pending, request, id) = {
            let mut wizard = self.lock();
            let (ticket, request) = wizard.begin_load_options(extra_context)?;
            (PendingCall::new(&self.inner, ticket, Wizard::abandon), request, wizard.id())
        };
        tracing::info!(
            "Generating options for '{}' (wizard {})",
            request.dimension_name,
            id
        );

        let result = generator.generate_options(&request).await;

        let ticket = pending.into_ticket();
        let mut wizard = self.lock();
        wizard.finish_load_options(ticket, result)?;
        Ok(wizard.view())
    }

    /// Convenience for tests and callers that confirm in one step.
    pub fn confirm_agenda(&self, edited: Option<Vec<DimensionInput>>) -> WizardResult<WizardView> {
        self.update(|w| w.confirm_agenda(edited))
    }

    fn lock(&self) -> MutexGuard<'_, Wizard> {
        self.inner.lock().expect("wizard lock poisoned")
    }
}

#[derive(Debug, Clone)]
pub struct ScopeHandle {
    inner: Arc<Mutex<ScopeWizard>>,
}

impl ScopeHandle {
    pub fn new(scope: ScopeWizard) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scope)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.lock().id()
    }

    pub fn view(&self) -> ScopeView {
        self.lock().view()
    }

    pub fn update<F>(&self, f: F) -> WizardResult<ScopeView>
    where
        F: FnOnce(&mut ScopeWizard) -> WizardResult<()>,
    {
        let mut scope = self.lock();
        f(&mut scope)?;
        Ok(scope.view())
    }

    /// Run `f` against the current state without mutating it.
    pub fn read<T>(&self, f: impl FnOnce(&ScopeWizard) -> T) -> T {
        f(&self.lock())
    }

    pub async fn submit_prompt(&self, generator: &dyn Generator, prompt: &str) -> WizardResult<ScopeView> {
        let (pending, id) = {
            let mut scope = self.lock();
            let ticket = scope.begin_submit_prompt(prompt)?;
            (PendingCall::new(&self.inner, ticket, ScopeWizard::abandon), scope.id())
        };
        tracing::info!("Generating scope questions for session {}", id);

        let result = generator.generate_ideas(prompt.trim()).await;

        let ticket = pending.into_ticket();
        let mut scope = self.lock();
        scope.finish_submit_prompt(ticket, prompt, result)?;
        Ok(scope.view())
    }

    fn lock(&self) -> MutexGuard<'_, ScopeWizard> {
        self.inner.lock().expect("scope lock poisoned")
    }
}

/// In-memory registry of live sessions keyed by id. Sessions idle past
/// the timeout are evicted whenever a new one is created.
#[derive(Debug)]
pub struct SessionRegistry<H> {
    sessions: Mutex<HashMap<Uuid, Entry<H>>>,
    idle_timeout: Duration,
}

#[derive(Debug)]
struct Entry<H> {
    handle: H,
    last_seen: Instant,
}

impl<H> Default for SessionRegistry<H> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl<H: Clone> SessionRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            ..Self::default()
        }
    }

    pub fn insert(&self, id: Uuid, handle: H) {
        self.lock().insert(
            id,
            Entry {
                handle,
                last_seen: Instant::now(),
            },
        );
    }

    /// Look up a session and mark it as recently used.
    pub fn get(&self, id: Uuid) -> WizardResult<H> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(&id).ok_or_else(|| WizardError::NotFound {
            kind: "Session",
            id: id.to_string(),
        })?;
        entry.last_seen = Instant::now();
        Ok(entry.handle.clone())
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Drop sessions not looked up within `max_idle`. Returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn register(&self, id: Uuid, handle: H) {
        self.evict_idle(self.idle_timeout);
        self.insert(id, handle);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry<H>>> {
        self.sessions.lock().expect("session registry lock poisoned")
    }
}

impl SessionRegistry<WizardHandle> {
    /// Create and register a fresh wizard.
    pub fn create(&self) -> WizardHandle {
        let handle = WizardHandle::new(Wizard::new());
        self.register(handle.id(), handle.clone());
        tracing::debug!("Created wizard session {}", handle.id());
        handle
    }
}

impl SessionRegistry<ScopeHandle> {
    pub fn create(&self) -> ScopeHandle {
        let handle = ScopeHandle::new(ScopeWizard::new());
        self.register(handle.id(), handle.clone());
        tracing::debug!("Created scope session {}", handle.id());
        handle
    }
}
