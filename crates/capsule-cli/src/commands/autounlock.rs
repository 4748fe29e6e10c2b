use std::time::Duration;

use tracing::{info, warn};

use capsule_core::{Scheduler, Shutdown};

use crate::app::App;
use crate::cli::{AutounlockArgs, Cli};
use crate::display::ConsoleDisplay;
use crate::passwords::PromptPassword;
use crate::ui::{badge, Badge, UiContext};

pub fn handle_autounlock(cli: &Cli, args: &AutounlockArgs) -> anyhow::Result<()> {
    let ui = UiContext::from_env(false, cli.quiet);
    let interactive = !args.no_input && ui.is_interactive();
    let app = App::resolve(cli)?;
    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| app.poll_interval());

    let mut scheduler =
        Scheduler::new(app.open_store()?).with_kdf_iterations(app.kdf_iterations());
    let mut passwords = PromptPassword::new(interactive);
    let mut display = ConsoleDisplay::new(ui.clone(), args.export_dir.clone(), interactive);

    let shutdown = Shutdown::new();
    spawn_interrupt_watcher(shutdown.clone())?;

    ui.say(&badge(
        &ui,
        Badge::Info,
        &format!(
            "Checking for due capsules every {}s. Press Ctrl+C to stop.",
            interval.as_secs()
        ),
    ));

    let cycles = scheduler.auto_unlock_loop(interval, &mut passwords, &mut display, &shutdown);

    ui.say(&badge(
        &ui,
        Badge::Ok,
        &format!("Stopped after {} check(s)", cycles),
    ));
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C, from a dedicated thread.
fn spawn_interrupt_watcher(shutdown: Shutdown) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to start signal runtime: {}", e))?;

    // Poll the listener once here so the handler is installed before the loop starts.
    let signal = runtime.block_on(async {
        let handle = tokio::spawn(tokio::signal::ctrl_c());
        tokio::task::yield_now().await;
        handle
    });

    std::thread::Builder::new()
        .name("interrupt-watcher".to_string())
        .spawn(move || {
            runtime.block_on(async {
                match signal.await {
                    Ok(Ok(())) => {
                        info!("interrupt received, stopping after the current cycle");
                        shutdown.cancel();
                    }
                    Ok(Err(err)) => warn!(error = %err, "failed to listen for Ctrl-C"),
                    Err(err) => warn!(error = %err, "Ctrl-C listener stopped"),
                }
            })
        })
        .map_err(|e| anyhow::anyhow!("Failed to spawn interrupt watcher: {}", e))?;
    Ok(())
}
