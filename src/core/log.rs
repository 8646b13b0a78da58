//! Diagnostics go to stderr so rendered tables on stdout stay clean.

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

fn app_targets(verbose: bool) -> Targets {
    if verbose {
        Targets::new()
            .with_target("goldfolio", LevelFilter::DEBUG)
            .with_target("fjall", LevelFilter::WARN)
            .with_target("lsm_tree", LevelFilter::WARN)
    } else {
        Targets::new().with_target("goldfolio", LevelFilter::OFF)
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { Level::DEBUG.as_str() } else { "off" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_targets(verbose))
        .with(env_filter(verbose))
        .init();
}
