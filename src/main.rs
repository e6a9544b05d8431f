use std::io;
use std::sync::{Arc, Mutex};

use desk_chat::app::App;
use desk_chat::backends::transport_from_config;
use desk_chat::config::EnvConfig;
use desk_chat::runtime::SyncController;
use desk_chat::tui::{self, Tui};

fn main() -> io::Result<()> {
    let config = EnvConfig::from_env().map_err(io::Error::other)?;
    let transport = transport_from_config(&config).map_err(io::Error::other)?;

    let app = Arc::new(Mutex::new(App::new()));
    let controller = SyncController::new(Arc::clone(&app), transport);

    let mut tui = Tui::new()?;
    let run_result = tui::run(&mut tui, &controller);
    let restore_result = tui.restore();

    run_result?;
    restore_result
}
