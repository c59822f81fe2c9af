use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Log filter directives: `VERSIFY_LOG`, then `RUST_LOG`, then `info`.
pub fn init() -> anyhow::Result<()> {
    let filter = match std::env::var("VERSIFY_LOG") {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
    }
    .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
