use capsule_core::{CapsuleStore, SqliteCapsuleStore};

use crate::app::App;
use crate::cli::{Cli, InitArgs};
use crate::config::write_config;
use crate::ui::{badge, hint, kv, Badge, UiContext};

pub fn handle_init(cli: &Cli, args: &InitArgs) -> anyhow::Result<()> {
    let ui = UiContext::from_env(false, cli.quiet);
    let app = App::resolve(cli)?;

    let wrote_config = if app.config_path.exists() && !args.force {
        false
    } else {
        let mut config = app.config.clone();
        config.store.data_dir = Some(app.data_dir.to_string_lossy().to_string());
        write_config(&app.config_path, &config)?;
        true
    };

    let store = SqliteCapsuleStore::open(app.store_config())?;
    let existing = store.list_all()?.len();

    ui.say(&badge(&ui, Badge::Ok, "Capsule store ready"));
    ui.say(&kv(&ui, "Data dir", &app.data_dir.display().to_string()));
    ui.say(&kv(&ui, "Config", &app.config_path.display().to_string()));
    if !wrote_config {
        ui.say(&hint(&ui, "Existing config kept; use --force to rewrite it."));
    }
    if existing > 0 {
        ui.say(&kv(&ui, "Capsules", &existing.to_string()));
    } else {
        ui.say(&hint(&ui, "timecapsule create --title <TITLE> --unlock 1d"));
    }

    Ok(())
}
