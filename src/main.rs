// Schedule Grid
// CLI entry point: loads the locally persisted schedule and prints a
// summary, which doubles as a quick persistence check.

use anyhow::Result;

use schedule_grid::services::persistence::FileStore;
use schedule_grid::services::settings::SettingsService;
use schedule_grid::services::store::ScheduleStore;

fn main() -> Result<()> {
    env_logger::init();

    log::info!("Starting schedule-grid");

    let settings = SettingsService::default_location()?.load();
    let persistence = FileStore::default_location()?;
    log::info!("Schedule file: {}", persistence.path().display());

    let store = ScheduleStore::new(Box::new(persistence));
    let schedule = store.schedule();

    println!("{}", schedule.meta.title);
    println!("{}", store.meta_line(settings.time_format));
    println!("Visible days: {}", store.visible_day_labels().join(", "));
    println!("Blocks: {}", schedule.items.len());

    Ok(())
}
