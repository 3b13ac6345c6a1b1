use anyhow::Result;
use cinevault_core::{RedirectInputs, decide};
use serde_json::json;

fn flag(value: bool) -> &'static str {
    if value { "yes" } else { "-" }
}

pub fn run(as_json: bool) -> Result<()> {
    if as_json {
        let rows: Vec<_> = RedirectInputs::all()
            .map(|inputs| {
                let decision = decide(inputs);
                json!({
                    "is_loading": inputs.is_loading,
                    "is_authenticated": inputs.is_authenticated,
                    "biometric_required": inputs.biometric_required,
                    "biometric_enabled": inputs.biometric_enabled,
                    "biometric_authenticated": inputs.biometric_authenticated,
                    "decision": decision.to_string(),
                    "target": decision.target().map(|route| route.to_string()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:<8} {:<8} {:<9} {:<8} {:<9} {:<20} target",
        "loading", "authed", "required", "enabled", "unlocked", "decision"
    );
    for inputs in RedirectInputs::all() {
        let decision = decide(inputs);
        println!(
            "{:<8} {:<8} {:<9} {:<8} {:<9} {:<20} {}",
            flag(inputs.is_loading),
            flag(inputs.is_authenticated),
            flag(inputs.biometric_required),
            flag(inputs.biometric_enabled),
            flag(inputs.biometric_authenticated),
            decision.to_string(),
            decision
                .target()
                .map(|route| route.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}
