use chrono::Local;
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Timestamped logger. `RUST_LOG` overrides `default_level` when set.
pub fn init(default_level: LevelFilter) {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, default_level)
        .parse_env(Env::default());

    if builder.try_init().is_err() {
        return;
    }
    log::debug!("Logger initialized at {}.", default_level);
}
