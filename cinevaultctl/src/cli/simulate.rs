//! Scripted boot walkthroughs against simulated platform capabilities.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cinevault_config::Config;
use cinevault_core::platform::{
    DocumentHooks, MemoryCredentialStore, MockAuthApi, Navigator, PromptOutcome,
    RecordingNavigator, SimulatedBiometricPrompt, SimulatedDocument, SimulatedScreenCapture,
    WindowMetrics,
};
use cinevault_core::{
    AppContext, AuthToken, Credentials, Platform, RedirectInputs, Route, decide,
};
use clap::ValueEnum;

const DEMO_EMAIL: &str = "demo@cinevault.app";
const DEMO_PASSWORD: &str = "popcorn42";
const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// No stored session: the user lands on sign-in
    Fresh,
    /// Stored session, biometrics off: straight to the app
    Restored,
    /// Stored session, biometrics on: challenge first
    Biometric,
    /// Unlocked session signs out
    Logout,
    All,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PromptArg {
    Success,
    Denied,
    Cancelled,
    Unavailable,
}

impl From<PromptArg> for PromptOutcome {
    fn from(val: PromptArg) -> Self {
        match val {
            PromptArg::Success => PromptOutcome::Success,
            PromptArg::Denied => PromptOutcome::Denied,
            PromptArg::Cancelled => PromptOutcome::Cancelled,
            PromptArg::Unavailable => PromptOutcome::Unavailable,
        }
    }
}

struct Sim {
    app: AppContext,
    navigator: Arc<RecordingNavigator>,
    capture: Arc<SimulatedScreenCapture>,
}

impl Sim {
    fn new(
        config: &Config,
        credentials: MemoryCredentialStore,
        prompts: &[PromptArg],
        web: bool,
    ) -> Result<Self> {
        let prompt = SimulatedBiometricPrompt::new();
        for outcome in prompts {
            prompt.push_outcome((*outcome).into());
        }
        let capture = Arc::new(if web {
            SimulatedScreenCapture::unsupported()
        } else {
            SimulatedScreenCapture::new()
        });
        let document = web.then(|| {
            Arc::new(SimulatedDocument::new(WindowMetrics {
                outer_width: 1440,
                outer_height: 900,
                inner_width: 1440,
                inner_height: 900,
            })) as Arc<dyn DocumentHooks>
        });
        let navigator = Arc::new(RecordingNavigator::new(Route::Home));
        let platform = Platform {
            credentials: Arc::new(credentials),
            auth_api: Arc::new(MockAuthApi::new().with_account(DEMO_EMAIL, DEMO_PASSWORD)),
            biometric: Arc::new(prompt),
            capture: capture.clone(),
            navigator: navigator.clone(),
            document,
        };
        let app = AppContext::init(config.clone(), platform)?;
        Ok(Self {
            app,
            navigator,
            capture,
        })
    }

    /// Wait until the redirector has seen the current state, then print it.
    async fn step(&self, label: &str) -> Result<()> {
        let inputs = RedirectInputs::from(&self.app.snapshot());
        let mut reports = self.app.redirects();
        tokio::time::timeout(
            SETTLE_TIMEOUT,
            reports.wait_for(|r| r.evaluations > 0 && r.inputs == inputs),
        )
        .await
        .context("redirector did not settle")?
        .context("redirector stopped")?;
        self.print(label, inputs);
        Ok(())
    }

    fn print(&self, label: &str, inputs: RedirectInputs) {
        println!(
            "  {label:<28} loading={:<5} authed={:<5} required={:<5} enabled={:<5} unlocked={:<5} -> {:<20} @ {}",
            inputs.is_loading,
            inputs.is_authenticated,
            inputs.biometric_required,
            inputs.biometric_enabled,
            inputs.biometric_authenticated,
            decide(inputs).to_string(),
            self.navigator.current_route(),
        );
    }

    async fn unlock(&self) -> Result<()> {
        let cancel = self.app.cancellation();
        loop {
            match self.app.biometric().challenge(&cancel).await {
                Ok(()) => return self.step("challenge passed").await,
                Err(err) if self.app.biometric().should_offer_logout() => {
                    println!("  challenge failed: {err}; offering logout");
                    self.app.session().logout().await;
                    return self.step("logged out").await;
                }
                Err(err) => {
                    println!(
                        "  challenge failed: {err} ({} attempts left)",
                        self.app.biometric().remaining_attempts()
                    );
                    if matches!(err, cinevault_core::BiometricError::Unavailable) {
                        bail!("biometric sensor unavailable");
                    }
                }
            }
        }
    }

    fn report_capture(&self) {
        let scope = self.app.protect_screen();
        let state = if self.capture.is_blocked() {
            "blocked by platform"
        } else if self.app.capture().advisory_active() {
            "advisory web shield"
        } else {
            "unprotected"
        };
        println!("  player mounted: capture {state}");
        drop(scope);
    }
}

fn stored_session(biometric_enabled: bool) -> MemoryCredentialStore {
    let store = MemoryCredentialStore::with_token(AuthToken::new(
        "demo-access",
        "demo-refresh",
        3600,
    ));
    store.set_biometric_enabled(biometric_enabled);
    store
}

pub async fn run(config: Config, scenario: Scenario, prompts: &[PromptArg], web: bool) -> Result<()> {
    let scenarios = match scenario {
        Scenario::All => vec![
            Scenario::Fresh,
            Scenario::Restored,
            Scenario::Biometric,
            Scenario::Logout,
        ],
        one => vec![one],
    };

    for scenario in scenarios {
        println!("scenario {scenario:?}");
        run_one(&config, scenario, prompts, web).await?;
        println!();
    }
    Ok(())
}

async fn run_one(config: &Config, scenario: Scenario, prompts: &[PromptArg], web: bool) -> Result<()> {
    let credentials = match scenario {
        Scenario::Fresh => MemoryCredentialStore::new(),
        Scenario::Restored => stored_session(false),
        Scenario::Biometric | Scenario::Logout | Scenario::All => stored_session(true),
    };
    let sim = Sim::new(config, credentials, prompts, web)?;

    sim.print("process start", RedirectInputs::from(&sim.app.snapshot()));
    if let Err(err) = sim.app.boot().await {
        println!("  hydration failed: {err}");
    }
    sim.step("hydrated").await?;

    match scenario {
        Scenario::Fresh => {
            sim.app
                .session()
                .login(Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
                .await?;
            sim.step("signed in").await?;
            sim.report_capture();
        }
        Scenario::Restored => sim.report_capture(),
        Scenario::Biometric => {
            sim.unlock().await?;
            if sim.app.session().is_authenticated() {
                sim.report_capture();
            }
        }
        Scenario::Logout => {
            sim.unlock().await?;
            sim.app.session().logout().await;
            sim.step("signed out").await?;
        }
        Scenario::All => {}
    }

    sim.app.teardown().await;
    Ok(())
}
