use daytrack_config::Config;

pub mod core;
pub mod error;
pub mod geocode;
pub mod prefs;
pub mod store;

pub fn init_logging(cfg: &impl Config) {
    let rust_log_config = cfg.get("RUST_LOG").ok();
    let mut logger_builder = env_logger::builder();
    if let Some(rust_log) = rust_log_config {
        logger_builder.parse_filters(&rust_log);
    } else {
        logger_builder.filter_level(log::LevelFilter::Info);
    }
    logger_builder.init();
    println!("max logging level is: {}.", log::max_level());
    println!("Use RUST_LOG environment variable to set one of the levels, e.g. RUST_LOG=error");
}
