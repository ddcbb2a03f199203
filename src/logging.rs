use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
///
/// The poller logs every cycle at debug, so it is kept at info outside dev
/// while read/navigate decisions in the bell stay visible.
pub fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => {
            "notification_bell=debug,hyper=info,reqwest=debug,rustls=warn,info"
        }
        Environment::Staging => {
            "notification_bell=debug,notification_bell::widget::poller=info,reqwest=info,warn"
        }
        Environment::Prod => {
            "notification_bell::widget=info,notification_bell::services=warn,notification_bell=info,warn"
        }
    }
}

/// Install the global subscriber. Output goes to stderr because stdout
/// carries the rendered widget.
pub fn init_logging(env: &Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    let installed = if env.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .try_init()
    };

    match installed {
        Ok(()) => tracing::info!(environment = ?env, "Logging initialized"),
        Err(e) => tracing::debug!(error = %e, "Subscriber already installed"),
    }
}
