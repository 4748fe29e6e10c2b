use chrono::Utc;

use capsule_core::scheduler::SkipReason;
use capsule_core::{Scheduler, UnlockReport};

use crate::app::App;
use crate::cli::{Cli, UnlockArgs};
use crate::display::ConsoleDisplay;
use crate::errors::CliError;
use crate::passwords::PromptPassword;
use crate::ui::{badge, Badge, UiContext};

pub fn handle_unlock(cli: &Cli, args: &UnlockArgs) -> anyhow::Result<()> {
    let ui = UiContext::from_env(args.json, cli.quiet);
    let interactive = !args.no_input && ui.is_interactive();
    let app = App::resolve(cli)?;

    let mut scheduler =
        Scheduler::new(app.open_store()?).with_kdf_iterations(app.kdf_iterations());
    let mut passwords = PromptPassword::new(interactive);
    let mut display = ConsoleDisplay::new(ui.clone(), args.export_dir.clone(), interactive);

    let report = scheduler.check_and_unlock(Utc::now(), &mut passwords, &mut display)?;

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&ui, &report);
    }

    if all_failed_authentication(&report) {
        return Err(CliError::auth_failed_with_hint(
            "Wrong password for every due capsule",
            "Hint: The capsules stay locked; run unlock again with the right password.",
        )
        .into());
    }
    Ok(())
}

/// Nothing opened and at least one capsule rejected its password.
fn all_failed_authentication(report: &UnlockReport) -> bool {
    report.unlocked.is_empty()
        && report
            .skipped
            .iter()
            .any(|s| s.reason == SkipReason::AuthenticationFailed)
}

pub(crate) fn print_summary(ui: &UiContext, report: &UnlockReport) {
    if report.due() == 0 {
        ui.say(&badge(ui, Badge::Info, "No capsules are ready to unlock"));
        return;
    }
    for skipped in &report.skipped {
        ui.say(&badge(
            ui,
            Badge::Warn,
            &format!("Capsule #{} stays locked: {}", skipped.id, skipped.message),
        ));
    }
    ui.say(&badge(
        ui,
        Badge::Ok,
        &format!(
            "Unlocked {} of {} due capsule(s)",
            report.unlocked.len(),
            report.due()
        ),
    ));
}
