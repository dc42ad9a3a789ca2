use std::io::Write;

pub mod app;
pub mod backend;
pub mod config;
pub mod environment;
pub mod error;
pub mod store;
pub mod views;

pub use app::App;
pub use error::AppError;
pub use store::{AppState, MarkerStore, StoreEvent};

fn get_file_name(path_str: Option<&str>) -> String {
    if let Some(path_str_val) = path_str {
        let path = std::path::Path::new(path_str_val);
        if let Some(file_name) = path.file_name() {
            if let Some(s) = file_name.to_str() {
                return s.to_string();
            }
        }
    }

    "unknown".to_string()
}

pub fn init_log() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{} [{style}{}{style:#}] {}] {}:{} - {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.target(),
                get_file_name(record.file()),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}
