//! Biometric step-up gate
//!
//! Sits on top of an authenticated session. The gate never starts or ends a
//! session; it only flips the biometric half of the shared snapshot.

use std::sync::Arc;

use cinevault_config::BiometricConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{BiometricError, BiometricResult};
use crate::platform::{
    BiometricPrompt, CredentialStore, PromptOutcome, PromptRequest, SensorAvailability,
};
use crate::session::GateStateStore;

#[derive(Clone)]
pub struct BiometricGate {
    state: GateStateStore,
    prompt: Arc<dyn BiometricPrompt>,
    credentials: Arc<dyn CredentialStore>,
    config: BiometricConfig,
}

impl std::fmt::Debug for BiometricGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiometricGate")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BiometricGate {
    pub fn new(
        state: GateStateStore,
        prompt: Arc<dyn BiometricPrompt>,
        credentials: Arc<dyn CredentialStore>,
        config: BiometricConfig,
    ) -> Self {
        Self {
            state,
            prompt,
            credentials,
            config,
        }
    }

    /// Query the sensor: hardware present and something enrolled.
    pub async fn availability(&self) -> SensorAvailability {
        self.prompt.availability().await
    }

    pub fn is_enabled(&self) -> bool {
        self.state.with_state(|s| s.biometric.enabled)
    }

    /// Turn the step-up on or off. Enabling asks the user to pass one
    /// confirmation prompt first; that prompt does not count against the
    /// attempt budget. The preference is persisted before the state
    /// changes; if that fails nothing changes. Disabling also drops any
    /// unlocked state.
    pub async fn set_enabled(&self, enabled: bool) -> BiometricResult<()> {
        if enabled {
            self.confirm_enrolment().await?;
        }

        self.credentials.save_biometric_enabled(enabled).await?;

        self.state.transition(|s| {
            s.biometric.enabled = enabled;
            if !enabled {
                s.biometric.authenticated = false;
            }
            true
        });
        info!(enabled, "biometric preference updated");
        Ok(())
    }

    async fn confirm_enrolment(&self) -> BiometricResult<()> {
        let (authenticated, epoch) = self
            .state
            .with_state(|s| (s.session.is_authenticated, s.epoch));
        if !authenticated {
            return Err(BiometricError::NotAuthenticated);
        }
        let sensor = self.availability().await;
        if !sensor.available {
            debug!(reason = ?sensor.reason, "cannot enable biometrics");
            return Err(BiometricError::Unavailable);
        }

        let request = PromptRequest {
            message: self.config.enable_prompt_message.clone(),
            cancel_label: self.config.cancel_label.clone(),
        };
        match self.prompt.prompt(&request).await {
            PromptOutcome::Success => {}
            PromptOutcome::Denied => return Err(BiometricError::Denied),
            PromptOutcome::Cancelled => return Err(BiometricError::Cancelled),
            PromptOutcome::Unavailable => return Err(BiometricError::Unavailable),
        }

        if self.state.with_state(|s| s.epoch) != epoch {
            debug!("session changed while confirming biometrics");
            return Err(BiometricError::Cancelled);
        }
        Ok(())
    }

    /// Whether a challenge follows every login, falling back to the
    /// configured default until the user has chosen.
    pub fn requires_on_login(&self) -> bool {
        self.state.with_state(|s| {
            s.biometric
                .require_on_login
                .unwrap_or(self.config.require_on_login)
        })
    }

    /// Save the user's "require biometrics on login" choice. While signed
    /// in it also applies to the current session: turning it off unlocks
    /// the gate, turning it on locks only sessions that were never unlocked.
    pub async fn set_required(&self, required: bool) -> BiometricResult<()> {
        self.credentials.save_biometric_required(required).await?;

        self.state.transition(|s| {
            s.biometric.require_on_login = Some(required);
            if s.session.is_authenticated {
                s.biometric.required = required && s.biometric.enabled;
            }
            true
        });
        info!(required, "biometric requirement updated");
        Ok(())
    }

    /// Let the current session through without a prompt.
    pub fn skip(&self) -> BiometricResult<()> {
        let applied = self.state.transition(|s| {
            if !s.session.is_authenticated {
                return false;
            }
            s.biometric.authenticated = true;
            true
        });
        if !applied && !self.state.with_state(|s| s.session.is_authenticated) {
            return Err(BiometricError::NotAuthenticated);
        }
        info!("biometric challenge skipped");
        Ok(())
    }

    /// Require a challenge before the current session unlocks. Ignored when
    /// nobody is signed in. Returns whether the flag is now set.
    pub fn mark_required(&self) -> bool {
        self.state.transition(|s| {
            if !s.session.is_authenticated {
                return false;
            }
            s.biometric.required = true;
            true
        });
        self.state
            .with_state(|s| s.session.is_authenticated && s.biometric.required)
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.state.with_state(|s| {
            self.config
                .max_attempts
                .saturating_sub(s.biometric.failed_attempts)
        })
    }

    /// Once the attempt budget is spent the only way forward is logout.
    pub fn should_offer_logout(&self) -> bool {
        self.remaining_attempts() == 0
    }

    /// Prompt the user. The outcome is applied only if the session that was
    /// current when the prompt opened is still current when it closes.
    ///
    /// Denied and dismissed prompts count against the attempt budget; the
    /// attempt that spends the budget already reports
    /// [`BiometricError::AttemptsExhausted`].
    pub async fn challenge(&self, cancel: &CancellationToken) -> BiometricResult<()> {
        let snapshot = self.state.current();
        if !snapshot.session.is_authenticated {
            return Err(BiometricError::NotAuthenticated);
        }
        if !snapshot.biometric.enabled || snapshot.biometric.authenticated {
            return Ok(());
        }
        let max_attempts = self.config.max_attempts;
        if snapshot.biometric.failed_attempts >= max_attempts {
            return Err(BiometricError::AttemptsExhausted {
                attempts: snapshot.biometric.failed_attempts,
            });
        }

        let request = PromptRequest {
            message: self.config.prompt_message.clone(),
            cancel_label: self.config.cancel_label.clone(),
        };
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("biometric challenge cancelled");
                return Err(BiometricError::Cancelled);
            }
            outcome = self.prompt.prompt(&request) => outcome,
        };

        let epoch = snapshot.epoch;
        match outcome {
            PromptOutcome::Success => {
                let applied = self.state.transition(|s| {
                    if s.epoch != epoch {
                        return false;
                    }
                    s.biometric.authenticated = true;
                    s.biometric.failed_attempts = 0;
                    true
                });
                if !applied {
                    debug!("session changed during challenge, dropping result");
                    return Err(BiometricError::Cancelled);
                }
                info!("biometric challenge passed");
                Ok(())
            }
            PromptOutcome::Denied | PromptOutcome::Cancelled => {
                let mut attempts = None;
                self.state.transition(|s| {
                    if s.epoch != epoch {
                        return false;
                    }
                    s.biometric.failed_attempts += 1;
                    attempts = Some(s.biometric.failed_attempts);
                    true
                });
                match attempts {
                    Some(attempts) if attempts >= max_attempts => {
                        warn!(attempts, "biometric attempts exhausted");
                        Err(BiometricError::AttemptsExhausted { attempts })
                    }
                    _ if outcome == PromptOutcome::Denied => {
                        debug!(?attempts, "biometric challenge denied");
                        Err(BiometricError::Denied)
                    }
                    _ => Err(BiometricError::Cancelled),
                }
            }
            PromptOutcome::Unavailable => {
                warn!("biometric sensor unavailable during challenge");
                Err(BiometricError::Unavailable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryCredentialStore, SimulatedBiometricPrompt};

    struct Harness {
        state: GateStateStore,
        prompt: Arc<SimulatedBiometricPrompt>,
        credentials: Arc<MemoryCredentialStore>,
        gate: BiometricGate,
    }

    fn harness(max_attempts: u32) -> Harness {
        let state = GateStateStore::new();
        let prompt = Arc::new(SimulatedBiometricPrompt::new());
        let credentials = Arc::new(MemoryCredentialStore::new());
        let config = BiometricConfig {
            max_attempts,
            ..BiometricConfig::default()
        };
        let gate = BiometricGate::new(
            state.clone(),
            prompt.clone(),
            credentials.clone(),
            config,
        );
        Harness {
            state,
            prompt,
            credentials,
            gate,
        }
    }

    fn sign_in(state: &GateStateStore, enabled: bool) {
        state.transition(|s| {
            s.session.is_loading = false;
            s.session.is_authenticated = true;
            s.biometric.enabled = enabled;
            s.biometric.required = enabled;
            s.epoch += 1;
            true
        });
    }

    #[tokio::test]
    async fn enabling_requires_session() {
        let h = harness(3);
        let err = h.gate.set_enabled(true).await.unwrap_err();
        assert!(matches!(err, BiometricError::NotAuthenticated));
    }

    #[tokio::test]
    async fn enabling_requires_sensor() {
        let state = GateStateStore::new();
        sign_in(&state, false);
        let gate = BiometricGate::new(
            state,
            Arc::new(SimulatedBiometricPrompt::without_sensor()),
            Arc::new(MemoryCredentialStore::new()),
            BiometricConfig::default(),
        );
        let err = gate.set_enabled(true).await.unwrap_err();
        assert!(matches!(err, BiometricError::Unavailable));
        assert!(!gate.is_enabled());
    }

    #[tokio::test]
    async fn preference_is_persisted_and_required_untouched() {
        let h = harness(3);
        sign_in(&h.state, false);

        h.gate.set_enabled(true).await.unwrap();
        assert!(h.credentials.load_biometric_enabled().await.unwrap());
        assert!(!h.state.current().biometric.required);
        assert_eq!(h.prompt.prompt_count(), 1);
    }

    #[tokio::test]
    async fn enabling_needs_a_passing_confirmation() {
        let h = harness(1);
        sign_in(&h.state, false);
        h.prompt.push_outcome(PromptOutcome::Denied);

        let err = h.gate.set_enabled(true).await.unwrap_err();
        assert!(matches!(err, BiometricError::Denied));
        assert!(!h.gate.is_enabled());
        assert!(!h.credentials.load_biometric_enabled().await.unwrap());
        // The confirmation is not a challenge.
        assert_eq!(h.gate.remaining_attempts(), 1);

        h.prompt.push_outcome(PromptOutcome::Cancelled);
        assert!(matches!(
            h.gate.set_enabled(true).await,
            Err(BiometricError::Cancelled)
        ));
        assert!(!h.gate.is_enabled());
    }

    #[tokio::test]
    async fn disabling_skips_the_prompt() {
        let h = harness(3);
        sign_in(&h.state, true);
        h.gate.set_enabled(false).await.unwrap();
        assert_eq!(h.prompt.prompt_count(), 0);
    }

    #[tokio::test]
    async fn required_preference_is_persisted_and_applied() {
        let h = harness(3);
        sign_in(&h.state, true);
        assert!(h.gate.requires_on_login());

        h.gate.set_required(false).await.unwrap();
        assert_eq!(h.credentials.load_biometric_required().await.unwrap(), Some(false));
        assert!(!h.gate.requires_on_login());
        assert!(!h.state.current().biometric.required);

        h.gate.set_required(true).await.unwrap();
        assert!(h.state.current().biometric.required);
    }

    #[tokio::test]
    async fn required_preference_survives_sign_out() {
        let h = harness(3);
        h.gate.set_required(false).await.unwrap();
        let biometric = h.state.current().biometric;
        assert_eq!(biometric.require_on_login, Some(false));
        assert!(!biometric.required);
    }

    #[tokio::test]
    async fn skip_unlocks_without_prompting() {
        let h = harness(3);
        assert!(matches!(h.gate.skip(), Err(BiometricError::NotAuthenticated)));

        sign_in(&h.state, true);
        h.gate.skip().unwrap();
        assert!(h.state.current().biometric.authenticated);
        assert_eq!(h.prompt.prompt_count(), 0);

        // Already unlocked: nothing left to do.
        h.gate.skip().unwrap();
    }

    #[tokio::test]
    async fn persistence_failure_changes_nothing() {
        let h = harness(3);
        sign_in(&h.state, false);
        h.credentials.set_failing(true);

        let err = h.gate.set_enabled(true).await.unwrap_err();
        assert!(matches!(err, BiometricError::Storage(_)));
        assert!(!h.gate.is_enabled());
    }

    #[tokio::test]
    async fn disabling_clears_unlock() {
        let h = harness(3);
        sign_in(&h.state, true);
        h.gate.challenge(&CancellationToken::new()).await.unwrap();
        assert!(h.state.current().biometric.authenticated);

        h.gate.set_enabled(false).await.unwrap();
        let biometric = h.state.current().biometric;
        assert!(!biometric.enabled);
        assert!(!biometric.authenticated);
    }

    #[tokio::test]
    async fn mark_required_ignored_without_session() {
        let h = harness(3);
        assert!(!h.gate.mark_required());
        sign_in(&h.state, false);
        assert!(h.gate.mark_required());
    }

    #[tokio::test]
    async fn denied_challenge_counts_and_keeps_lock() {
        let h = harness(3);
        sign_in(&h.state, true);
        h.prompt.push_outcome(PromptOutcome::Denied);

        let err = h.gate.challenge(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, BiometricError::Denied));
        assert!(!h.state.current().biometric.authenticated);
        assert_eq!(h.gate.remaining_attempts(), 2);
    }

    #[tokio::test]
    async fn unavailable_sensor_does_not_count() {
        let h = harness(3);
        sign_in(&h.state, true);
        h.prompt.push_outcome(PromptOutcome::Unavailable);

        let err = h.gate.challenge(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, BiometricError::Unavailable));
        assert_eq!(h.gate.remaining_attempts(), 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_stops_prompting() {
        let h = harness(2);
        sign_in(&h.state, true);
        h.prompt.set_fallback(PromptOutcome::Denied);
        let cancel = CancellationToken::new();

        assert!(matches!(
            h.gate.challenge(&cancel).await,
            Err(BiometricError::Denied)
        ));
        assert!(matches!(
            h.gate.challenge(&cancel).await,
            Err(BiometricError::AttemptsExhausted { attempts: 2 })
        ));
        assert!(h.gate.should_offer_logout());

        assert!(matches!(
            h.gate.challenge(&cancel).await,
            Err(BiometricError::AttemptsExhausted { .. })
        ));
        assert_eq!(h.prompt.prompt_count(), 2);
    }

    #[tokio::test]
    async fn challenge_while_disabled_is_a_no_op() {
        let h = harness(3);
        sign_in(&h.state, false);
        h.gate.challenge(&CancellationToken::new()).await.unwrap();
        assert_eq!(h.prompt.prompt_count(), 0);
        assert!(!h.state.current().biometric.authenticated);
    }

    #[tokio::test]
    async fn result_for_stale_session_is_dropped() {
        let h = harness(3);
        sign_in(&h.state, true);
        h.prompt.set_latency(std::time::Duration::from_millis(50));

        let gate = h.gate.clone();
        let pending = tokio::spawn(async move {
            gate.challenge(&CancellationToken::new()).await
        });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        // A new session started while the prompt was open.
        sign_in(&h.state, true);

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(BiometricError::Cancelled)));
        assert!(!h.state.current().biometric.authenticated);
    }
}
