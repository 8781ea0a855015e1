use backdrop::{app, AppSettings};

fn main() {
    env_logger::init();

    let settings = AppSettings::load().unwrap_or_else(|e| {
        log::warn!("{}; using default settings", e);
        AppSettings::default()
    });

    if let Err(e) = app::run(settings) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
