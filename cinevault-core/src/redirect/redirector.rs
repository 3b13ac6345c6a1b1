//! Reactive redirector
//!
//! Subscribes to the gate snapshot channel and turns every settled change of
//! the redirect inputs into at most one replace-style navigation.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::policy::{RedirectDecision, RedirectInputs, Route, decide};
use crate::platform::Navigator;
use crate::session::GateSnapshot;

/// What the redirector did on its latest evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirectReport {
    pub inputs: RedirectInputs,
    pub decision: Option<RedirectDecision>,
    /// Route replaced to by the latest evaluation, if it navigated.
    pub navigated_to: Option<Route>,
    /// Evaluations so far. Identical inputs are not evaluated again.
    pub evaluations: u64,
    /// Navigations issued so far.
    pub navigations: u64,
}

pub struct AuthRedirector {
    navigator: Arc<dyn Navigator>,
    last_inputs: Option<RedirectInputs>,
    last_decision: Option<RedirectDecision>,
    reports: watch::Sender<RedirectReport>,
}

impl std::fmt::Debug for AuthRedirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRedirector")
            .field("last_inputs", &self.last_inputs)
            .field("last_decision", &self.last_decision)
            .finish_non_exhaustive()
    }
}

impl AuthRedirector {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        let (reports, _) = watch::channel(RedirectReport::default());
        Self {
            navigator,
            last_inputs: None,
            last_decision: None,
            reports,
        }
    }

    pub fn reports(&self) -> watch::Receiver<RedirectReport> {
        self.reports.subscribe()
    }

    pub fn last_decision(&self) -> Option<RedirectDecision> {
        self.last_decision
    }

    /// Evaluate `inputs` and navigate if needed. Returns the route replaced
    /// to. Re-applying the previous inputs is a no-op.
    pub fn evaluate(&mut self, inputs: RedirectInputs) -> Option<Route> {
        if self.last_inputs == Some(inputs) {
            return None;
        }

        let decision = decide(inputs);
        let previous = self.last_decision.replace(decision);
        self.last_inputs = Some(inputs);

        let current = self.navigator.current_route();
        let target = match decision.target() {
            Some(target) if !current.satisfies(&target) => Some(target),
            Some(_) => None,
            // Leaving a gate screen once access is granted.
            None if decision == RedirectDecision::Stay
                && previous.is_some_and(|p| p.is_gate())
                && current.is_gate() =>
            {
                Some(Route::Home)
            }
            None => None,
        };

        debug!(?inputs, %decision, %current, "redirect policy evaluated");

        if let Some(route) = &target {
            info!(from = %current, to = %route, %decision, "redirecting");
            self.navigator.replace(route.clone());
        }

        self.reports.send_modify(|report| {
            report.inputs = inputs;
            report.decision = Some(decision);
            report.navigated_to = target.clone();
            report.evaluations += 1;
            if target.is_some() {
                report.navigations += 1;
            }
        });

        target
    }

    /// Follow `snapshots` until `cancel` fires or the channel closes.
    pub async fn run(
        mut self,
        mut snapshots: watch::Receiver<GateSnapshot>,
        cancel: CancellationToken,
    ) {
        let initial = RedirectInputs::from(&*snapshots.borrow_and_update());
        self.evaluate(initial);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("redirector cancelled");
                    break;
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        debug!("gate channel closed, redirector stopping");
                        break;
                    }
                    let inputs = RedirectInputs::from(&*snapshots.borrow_and_update());
                    self.evaluate(inputs);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RecordingNavigator;

    fn inputs(loading: bool, auth: bool, req: bool, en: bool, bio: bool) -> RedirectInputs {
        RedirectInputs {
            is_loading: loading,
            is_authenticated: auth,
            biometric_required: req,
            biometric_enabled: en,
            biometric_authenticated: bio,
        }
    }

    #[test]
    fn waits_then_sends_to_auth_once() {
        let nav = Arc::new(RecordingNavigator::new(Route::Home));
        let mut redirector = AuthRedirector::new(nav.clone());

        assert_eq!(redirector.evaluate(inputs(true, false, false, false, false)), None);
        assert_eq!(
            redirector.evaluate(inputs(false, false, false, false, false)),
            Some(Route::Auth)
        );
        assert_eq!(redirector.evaluate(inputs(false, false, false, false, false)), None);
        assert_eq!(nav.replacements(), vec![Route::Auth]);
    }

    #[test]
    fn no_navigation_when_already_on_target() {
        let nav = Arc::new(RecordingNavigator::new(Route::parse("/auth/signup")));
        let mut redirector = AuthRedirector::new(nav.clone());

        assert_eq!(redirector.evaluate(inputs(false, false, false, false, false)), None);
        assert!(nav.replacements().is_empty());
    }

    #[test]
    fn releases_gate_screen_once_unlocked() {
        let nav = Arc::new(RecordingNavigator::new(Route::Home));
        let mut redirector = AuthRedirector::new(nav.clone());

        redirector.evaluate(inputs(false, true, true, true, false));
        assert_eq!(nav.current_route(), Route::BiometricAuth);

        assert_eq!(
            redirector.evaluate(inputs(false, true, true, true, true)),
            Some(Route::Home)
        );
        assert_eq!(nav.replacements(), vec![Route::BiometricAuth, Route::Home]);
    }

    #[test]
    fn stay_leaves_ordinary_screens_alone() {
        let nav = Arc::new(RecordingNavigator::new(Route::parse("/player/7")));
        let mut redirector = AuthRedirector::new(nav.clone());

        assert_eq!(redirector.evaluate(inputs(false, true, false, false, false)), None);
        assert_eq!(redirector.last_decision(), Some(RedirectDecision::Stay));
        assert!(nav.replacements().is_empty());
    }

    #[test]
    fn reports_track_evaluations() {
        let nav = Arc::new(RecordingNavigator::new(Route::Home));
        let mut redirector = AuthRedirector::new(nav);
        let reports = redirector.reports();

        redirector.evaluate(inputs(true, false, false, false, false));
        redirector.evaluate(inputs(true, false, false, false, false));
        redirector.evaluate(inputs(false, false, false, false, false));

        let report = reports.borrow().clone();
        assert_eq!(report.evaluations, 2);
        assert_eq!(report.navigations, 1);
        assert_eq!(report.decision, Some(RedirectDecision::Auth));
    }
}
