//! launchdock - terminal front-end for the dock-apps catalog.
//!
//! Runs the scan on a worker thread and receives the finished catalog over
//! a channel, the same shape a GUI event loop would consume it in.

use std::error::Error;

use crossbeam_channel::{Receiver, bounded};
use dock_apps::{CatalogBuilder, IconStore, Platform, ScanOutcome, SystemPaths};
use log::info;

/// Completion message from the scan worker.
enum ScanEvent {
    Finished(ScanOutcome),
}

/// Submit one scan to a worker thread. The returned channel delivers the
/// result; the caller treats the scan as in flight until then (a GUI would
/// disable its scan trigger on exactly that condition).
fn spawn_scan(platform: Platform, paths: SystemPaths) -> Receiver<ScanEvent> {
    let (tx, rx) = bounded(1);
    std::thread::spawn(move || {
        let outcome = CatalogBuilder::new(platform, paths).scan();
        // Receiver may be gone if a newer scan superseded this one.
        let _ = tx.send(ScanEvent::Finished(outcome));
    });
    rx
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let platform = Platform::detect();
    let paths = SystemPaths::detect(platform);
    info!("detected platform: {platform:?}");

    println!("Scanning for applications...");
    let rx = spawn_scan(platform, paths.clone());
    let ScanEvent::Finished(outcome) = rx.recv()?;

    println!(
        "Found {} applications ({} candidates skipped)",
        outcome.records.len(),
        outcome.issues.len()
    );

    let icons = IconStore::new(platform, paths);
    for record in &outcome.records {
        let kind = if record.is_system_app { "system" } else { "user  " };
        let icon = if icons.resolve(record).is_some() { "*" } else { " " };
        println!(
            "{icon} [{kind}] {:<32} {}",
            record.display_name, record.launch_path
        );
    }

    Ok(())
}
