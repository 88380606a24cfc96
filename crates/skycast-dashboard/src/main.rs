use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use skycast_dashboard::{App, LogView};

fn main() -> Result<()> {
    skycast_core::init();

    let (config, _) = skycast_core::Config::load_validated()?;
    tracing::info!("Config directory: {}", config.config_dir.display());

    let mut app = App::new(&config, Box::new(LogView))?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        app.runtime().spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    app.dashboard_mut().restore();

    // Headless: updates are written to the log until interrupted
    while !stop.load(Ordering::SeqCst) {
        app.dashboard_mut().process_next(Duration::from_millis(250));
    }

    app.shutdown();
    Ok(())
}
