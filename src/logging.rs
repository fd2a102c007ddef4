/// Sets up `env_logger`. `RUST_LOG` takes precedence over `default_level`.
///
/// Safe to call more than once; only the first call installs a logger.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}
