use std::io::Write;

/// Filter directive for the logger. An explicit level wins over the debug flag.
pub fn log_filter(debug: bool, level: Option<&str>) -> String {
    match level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(level) => level.to_string(),
        None if debug => "debug".to_string(),
        None => "info".to_string(),
    }
}

/// Initialise `env_logger` with `--log-level` (or `RUST_LOG`) when given,
/// otherwise with the debug flag.
pub fn init_logging(debug: bool, level: Option<&str>) {
    env_logger::Builder::new()
        .parse_filters(&log_filter(debug, level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
