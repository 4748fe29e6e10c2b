use chrono::{DateTime, Utc};

use capsule_core::storage::{CapsuleStatus, CapsuleSummary};
use capsule_core::CapsuleStore;

use crate::app::App;
use crate::cli::{CheckArgs, Cli};
use crate::ui::{badge, table, Badge, Column, UiContext};

pub fn handle_check(cli: &Cli, args: &CheckArgs) -> anyhow::Result<()> {
    let ui = UiContext::from_env(args.json, cli.quiet);
    let app = App::resolve(cli)?;
    let store = app.open_store()?;
    let capsules = store.list_all()?;

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&capsules)?);
        return Ok(());
    }

    if capsules.is_empty() {
        ui.say(&badge(&ui, Badge::Info, "No capsules yet"));
        return Ok(());
    }

    let now = Utc::now();
    let columns = [
        Column::new("Id"),
        Column::new("Title"),
        Column::new("Type"),
        Column::new("Unlock time"),
        Column::new("Status"),
    ];
    let rows: Vec<Vec<String>> = capsules
        .iter()
        .map(|capsule| capsule_row(capsule, now))
        .collect();
    println!("{}", table(&ui, &columns, &rows));
    Ok(())
}

fn capsule_row(capsule: &CapsuleSummary, now: DateTime<Utc>) -> Vec<String> {
    vec![
        capsule.id.to_string(),
        capsule.title.clone(),
        capsule.content_type.to_string(),
        capsule.unlock_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        status_label(capsule, now),
    ]
}

fn status_label(capsule: &CapsuleSummary, now: DateTime<Utc>) -> String {
    match capsule.status {
        CapsuleStatus::Unlocked => "unlocked".to_string(),
        CapsuleStatus::Locked if capsule.unlock_time <= now => "locked (ready)".to_string(),
        CapsuleStatus::Locked => "locked".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsule_core::storage::ContentType;
    use chrono::Duration;

    fn summary(status: CapsuleStatus, unlock_time: DateTime<Utc>) -> CapsuleSummary {
        CapsuleSummary {
            id: 3,
            title: "note".to_string(),
            content_type: ContentType::Photo,
            unlock_time,
            status,
        }
    }

    #[test]
    fn test_status_label() {
        let now = Utc::now();
        let past = now - Duration::hours(1);
        let future = now + Duration::hours(1);

        assert_eq!(status_label(&summary(CapsuleStatus::Locked, future), now), "locked");
        assert_eq!(
            status_label(&summary(CapsuleStatus::Locked, past), now),
            "locked (ready)"
        );
        assert_eq!(
            status_label(&summary(CapsuleStatus::Unlocked, past), now),
            "unlocked"
        );
    }

    #[test]
    fn test_capsule_row() {
        let now = Utc::now();
        let row = capsule_row(&summary(CapsuleStatus::Locked, now), now);
        assert_eq!(row[0], "3");
        assert_eq!(row[2], "photo");
        assert!(row[3].ends_with("UTC"));
    }
}
