use capsule_core::CapsuleStore;

use crate::app::App;
use crate::cli::Cli;
use crate::errors::CliError;
use crate::ui::{badge, hint, kv, Badge, UiContext};

pub fn handle_doctor(cli: &Cli) -> anyhow::Result<()> {
    let ui = UiContext::from_env(false, cli.quiet);
    let app = App::resolve(cli)?;
    let store = app.open_store()?;
    let report = store.check_integrity()?;

    if !report.is_ok() {
        eprintln!("Doctor: FAILED");
        for problem in &report.sqlite_problems {
            eprintln!("- catalog: {}", problem);
        }
        for (id, path) in &report.missing_blobs {
            eprintln!("- capsule #{}: ciphertext missing ({})", id, path);
        }
        eprintln!(
            "{}",
            hint(&ui, "Restore the data directory from a backup before unlocking.")
        );
        return Err(CliError::IntegrityFailed(format!(
            "{} problem(s) found",
            report.sqlite_problems.len() + report.missing_blobs.len()
        ))
        .into());
    }

    let capsules = store.list_all()?.len();
    ui.say(&badge(&ui, Badge::Ok, "Doctor: OK"));
    ui.say(&kv(&ui, "Config", &app.config_path.display().to_string()));
    ui.say(&kv(&ui, "Data dir", &app.data_dir.display().to_string()));
    ui.say(&kv(&ui, "Capsules", &capsules.to_string()));
    Ok(())
}
