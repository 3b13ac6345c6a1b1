use anyhow::{Context, Result};
use cinevault_config::{Config, ConfigLoader};
use serde_json::json;

pub fn check(loader: &ConfigLoader, as_json: bool) -> Result<()> {
    let load = loader.load().context("configuration is invalid")?;
    let config = &load.config;
    let warnings: Vec<String> = load.warnings.iter().map(ToString::to_string).collect();

    if as_json {
        let report = json!({
            "source": config.metadata.config_path().map(|p| p.display().to_string()),
            "env_file_loaded": config.metadata.env_file_loaded,
            "session": {
                "token_expiry_buffer": humantime::format_duration(config.session.token_expiry_buffer).to_string(),
                "remote_logout_timeout": humantime::format_duration(config.session.remote_logout_timeout).to_string(),
            },
            "biometric": {
                "require_on_login": config.biometric.require_on_login,
                "max_attempts": config.biometric.max_attempts,
                "prompt_message": config.biometric.prompt_message,
                "enable_prompt_message": config.biometric.enable_prompt_message,
            },
            "capture": {
                "enabled": config.capture.enabled,
                "devtools_poll_interval": humantime::format_duration(config.capture.devtools_poll_interval).to_string(),
                "devtools_threshold_px": config.capture.devtools_threshold_px,
            },
            "storage": format!("{:?}", config.storage.backend).to_lowercase(),
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_table(config);
    if warnings.is_empty() {
        println!("\nconfiguration OK");
    } else {
        println!("\nwarnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}

fn print_table(config: &Config) {
    let source = config
        .metadata
        .config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    println!("source                  {source}");
    println!(
        "token expiry buffer     {}",
        humantime::format_duration(config.session.token_expiry_buffer)
    );
    println!(
        "remote logout timeout   {}",
        humantime::format_duration(config.session.remote_logout_timeout)
    );
    println!("require biometric       {}", config.biometric.require_on_login);
    println!("max biometric attempts  {}", config.biometric.max_attempts);
    println!("capture protection      {}", config.capture.enabled);
    println!(
        "devtools poll interval  {}",
        humantime::format_duration(config.capture.devtools_poll_interval)
    );
    println!(
        "devtools threshold      {}px",
        config.capture.devtools_threshold_px
    );
    println!("storage                 {:?}", config.storage.backend);
}
