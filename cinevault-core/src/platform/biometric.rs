//! Biometric sensor port.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometryKind {
    Fingerprint,
    FaceRecognition,
    Iris,
    /// Sensor present but the platform does not say which.
    Generic,
}

impl BiometryKind {
    pub fn label(&self) -> &'static str {
        match self {
            BiometryKind::Fingerprint => "Fingerprint",
            BiometryKind::FaceRecognition => "Face Recognition",
            BiometryKind::Iris => "Iris",
            BiometryKind::Generic => "Biometrics",
        }
    }
}

/// Result of probing the sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorAvailability {
    pub available: bool,
    pub kind: Option<BiometryKind>,
    pub reason: Option<String>,
}

impl SensorAvailability {
    pub fn available(kind: BiometryKind) -> Self {
        Self {
            available: true,
            kind: Some(kind),
            reason: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            kind: None,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub message: String,
    pub cancel_label: String,
}

/// What the platform prompt reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Success,
    Denied,
    Cancelled,
    Unavailable,
}

#[async_trait]
pub trait BiometricPrompt: Send + Sync {
    async fn availability(&self) -> SensorAvailability;

    async fn prompt(&self, request: &PromptRequest) -> PromptOutcome;
}

/// Scripted sensor. Outcomes are consumed in order; once the script runs
/// out every prompt returns the fallback outcome.
#[derive(Debug)]
pub struct SimulatedBiometricPrompt {
    availability: Mutex<SensorAvailability>,
    script: Mutex<VecDeque<PromptOutcome>>,
    fallback: Mutex<PromptOutcome>,
    latency: Mutex<Option<Duration>>,
    prompts: AtomicUsize,
}

impl Default for SimulatedBiometricPrompt {
    fn default() -> Self {
        Self {
            availability: Mutex::new(SensorAvailability::available(
                BiometryKind::Fingerprint,
            )),
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(PromptOutcome::Success),
            latency: Mutex::new(None),
            prompts: AtomicUsize::new(0),
        }
    }
}

impl SimulatedBiometricPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_sensor() -> Self {
        let prompt = Self::default();
        *prompt.availability.lock() =
            SensorAvailability::unavailable("No biometric hardware available");
        *prompt.fallback.lock() = PromptOutcome::Unavailable;
        prompt
    }

    pub fn push_outcome(&self, outcome: PromptOutcome) {
        self.script.lock().push_back(outcome);
    }

    pub fn set_fallback(&self, outcome: PromptOutcome) {
        *self.fallback.lock() = outcome;
    }

    /// Hold each prompt open for `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::Acquire)
    }
}

#[async_trait]
impl BiometricPrompt for SimulatedBiometricPrompt {
    async fn availability(&self) -> SensorAvailability {
        self.availability.lock().clone()
    }

    async fn prompt(&self, _request: &PromptRequest) -> PromptOutcome {
        self.prompts.fetch_add(1, Ordering::AcqRel);
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| *self.fallback.lock())
    }
}
