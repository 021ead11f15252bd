//! Session Registry - Multi-Session State Management
//!
//! A host serving several users at once keeps one [`SessionState`] per user.
//! The registry keys them by [`SessionId`] and routes each raw input to the
//! right controller operation for that session's phase.
//!
//! # Thread Safety
//!
//! Sessions live in a `DashMap`, so independent sessions can be driven from
//! different tasks without a global lock. A session is only ever touched
//! through its own shard entry.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::controller::{AnswerOutcome, Controller, ControllerError, RestartDecision};
use crate::estimator::EstimateResult;
use crate::messages::SessionId;
use crate::session::{HistoryEntry, Phase, SessionState};
use crate::validation::Advisory;

/// Errors from registry operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// No session with that ID is open
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
    /// The controller rejected the input
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// What one submitted input changed
#[derive(Clone, Debug, Default)]
pub struct SubmitReport {
    /// The transcript was reset; `entries` is the complete new transcript
    pub reset: bool,
    /// History entries appended by this input
    pub entries: Vec<HistoryEntry>,
    /// Notice attached to an accepted answer
    pub advisory: Option<Advisory>,
    /// Estimate computed by this input
    pub estimate: Option<EstimateResult>,
}

/// Registry of open sessions
#[derive(Clone)]
pub struct SessionRegistry {
    controller: Controller,
    sessions: Arc<DashMap<SessionId, SessionState>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Controller::default())
    }
}

impl SessionRegistry {
    /// Create an empty registry whose sessions share `controller`
    #[must_use]
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Open a fresh session and return its ID
    pub fn open(&self) -> SessionId {
        let state = self.controller.start();
        let id = state.id.clone();
        self.sessions.insert(id.clone(), state);
        tracing::info!(session = %id, "Session opened");
        id
    }

    /// Feed one line of user input to a session
    ///
    /// Answers go to the active question (running the estimate after the
    /// last one); after the estimate the input is the restart decision.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownSession`] for an unknown ID, and
    /// [`RegistryError::Controller`] when the input is rejected. A rejected
    /// input leaves the session unchanged.
    pub fn submit(&self, id: &SessionId, raw: &str) -> Result<SubmitReport, RegistryError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownSession(id.clone()))?;
        let state = entry.value_mut();

        let before = state.history().len();
        let head = state.history().first().map(|e| e.id.clone());
        let mut report = SubmitReport::default();

        match state.phase() {
            Phase::Asking { .. } => {
                let outcome = self.controller.submit_answer(state, raw)?;
                report.advisory = outcome.advisory().cloned();
                if matches!(outcome, AnswerOutcome::Finished { .. }) {
                    report.estimate = Some(self.controller.complete(state)?);
                }
            }
            Phase::Complete => {
                report.estimate = Some(self.controller.complete(state)?);
            }
            Phase::AwaitingRestart | Phase::Terminated => {
                if self.controller.submit_restart_decision(state, raw)?
                    == RestartDecision::Restarted
                {
                    tracing::debug!(session = %id, "Session restarted");
                }
            }
        }

        report.reset = state.history().first().map(|e| &e.id) != head.as_ref();
        let from = if report.reset { 0 } else { before };
        report.entries = state.history()[from..].to_vec();
        Ok(report)
    }

    /// Snapshot of a session
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<SessionState> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    /// Reset a session to the first question
    ///
    /// Returns false if the session is unknown.
    pub fn reset(&self, id: &SessionId) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut entry) => {
                self.controller.reset(entry.value_mut());
                true
            }
            None => false,
        }
    }

    /// Close a session, returning its final state
    pub fn close(&self, id: &SessionId) -> Option<SessionState> {
        let removed = self.sessions.remove(id).map(|(_, state)| state);
        if removed.is_some() {
            tracing::info!(session = %id, "Session closed");
        }
        removed
    }

    /// Number of open sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("session_count", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EstimateParams;
    use crate::validation::ValidationError;

    #[test]
    fn test_open_and_close() {
        let registry = SessionRegistry::default();
        assert!(registry.is_empty());

        let id = registry.open();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&id).unwrap().history().len(), 1);

        assert!(registry.close(&id).is_some());
        assert!(registry.close(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let registry = SessionRegistry::default();
        let a = registry.open();
        let b = registry.open();

        registry.submit(&a, "both").unwrap();
        registry.submit(&a, "2").unwrap();

        assert_eq!(registry.get(&a).unwrap().cursor(), 2);
        assert_eq!(registry.get(&b).unwrap().cursor(), 0);
        assert!(registry.get(&b).unwrap().answers().is_empty());
    }

    #[test]
    fn test_submit_returns_new_entries() {
        let registry = SessionRegistry::default();
        let id = registry.open();

        let report = registry.submit(&id, "exterior").unwrap();
        assert!(!report.reset);
        let contents: Vec<_> = report.entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["exterior", "How many buildings do you plan to paint?"]
        );
    }

    #[test]
    fn test_last_answer_runs_estimate() {
        let registry = SessionRegistry::default();
        let id = registry.open();
        for line in ["both", "2", "500", "3"] {
            registry.submit(&id, line).unwrap();
        }
        let report = registry.submit(&id, "2").unwrap();
        assert_eq!(report.estimate.map(|r| r.cans), Some(131));
        // answer, summary, restart prompt
        assert_eq!(report.entries.len(), 3);
    }

    #[test]
    fn test_restart_reports_reset() {
        let registry = SessionRegistry::default();
        let id = registry.open();
        for line in ["both", "2", "500", "3", "2"] {
            registry.submit(&id, line).unwrap();
        }
        let report = registry.submit(&id, "sure").unwrap();
        assert!(report.reset);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(registry.get(&id).unwrap().phase(), Phase::Asking { cursor: 0 });
    }

    #[test]
    fn test_rejected_input() {
        let registry = SessionRegistry::default();
        let id = registry.open();
        let err = registry.submit(&id, "lots").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Controller(ControllerError::Validation(
                ValidationError::InvalidChoice { .. }
            ))
        ));

        let unknown = SessionId::new();
        assert_eq!(
            registry.submit(&unknown, "both").unwrap_err(),
            RegistryError::UnknownSession(unknown)
        );
    }

    #[test]
    fn test_failed_estimate_leaves_session_unchanged() {
        let registry = SessionRegistry::new(Controller::new(EstimateParams {
            coverage: 0.0,
            ..EstimateParams::default()
        }));
        let id = registry.open();
        for raw in ["both", "2", "500", "3"] {
            registry.submit(&id, raw).unwrap();
        }
        let before = registry.get(&id).unwrap();

        let err = registry.submit(&id, "2").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Controller(ControllerError::Estimate(_))
        ));
        let after = registry.get(&id).unwrap();
        assert_eq!(after.phase(), Phase::Asking { cursor: 4 });
        assert_eq!(after.history().len(), before.history().len());
        assert_eq!(after.answers().len(), 4);
    }

    #[test]
    fn test_reset() {
        let registry = SessionRegistry::default();
        let id = registry.open();
        registry.submit(&id, "both").unwrap();
        assert!(registry.reset(&id));
        assert_eq!(registry.get(&id).unwrap().cursor(), 0);
        assert!(!registry.reset(&SessionId::new()));
    }
}
