use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use comicdex_lib::settings::settings_path;
use comicdex_lib::Settings;

use crate::CliError;

/// Show the effective settings: defaults, file, environment, then flags.
pub(crate) fn run_config_show(settings: &Settings) -> Result<(), CliError> {
    let path = settings_path();

    log::info!(
        "{}",
        "comicdex Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let fields = [
        (
            "database.path",
            settings.database.resolved_path().display().to_string(),
        ),
        (
            "database.pool_size",
            settings.database.pool_size.to_string(),
        ),
        (
            "auth.permission_prefix",
            settings.auth.permission_prefix.clone(),
        ),
        ("cache.enabled", settings.cache.enabled.to_string()),
        ("cache.ttl_secs", settings.cache.ttl_secs.to_string()),
        ("cache.sweep_secs", settings.cache.sweep_secs.to_string()),
    ];
    for (name, value) in fields {
        log::info!(
            "  {} {}",
            format!("{name}:").if_supports_color(Stdout, |t| t.cyan()),
            value,
        );
    }
    Ok(())
}

pub(crate) fn run_config_path() -> Result<(), CliError> {
    println!("{}", settings_path().display());
    Ok(())
}
