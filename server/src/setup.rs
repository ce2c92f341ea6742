use color_eyre::eyre::WrapErr;
use sentry::ClientInitGuard;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

pub fn setup_sentry() -> Option<ClientInitGuard> {
    let Ok(dsn) = std::env::var("SENTRY_DSN") else {
        println!("SENTRY_DSN not set, skipping Sentry");

        return None;
    };

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 0.2,
            ..Default::default()
        },
    ));

    Some(guard)
}

pub fn setup_tracing(crate_name: &str) -> color_eyre::Result<()> {
    color_eyre::install()?;

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!("warn,{crate_name}=trace,db=debug,tower_http=debug")
    });

    let env_filter = EnvFilter::builder()
        .parse(&rust_log)
        .wrap_err_with(|| format!("Couldn't create env filter from {rust_log}"))?;

    let heirarchical = HierarchicalLayer::default()
        .with_writer(std::io::stdout)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_thread_names(true)
        .with_thread_ids(true)
        .with_verbose_exit(true)
        .with_verbose_entry(true)
        .with_targets(true);

    let sentry_layer = sentry::Hub::current()
        .client()
        .is_some()
        .then(sentry_tracing::layer);

    Registry::default()
        .with(heirarchical)
        .with(sentry_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}
