use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset. Engine drop/fallback diagnostics
/// are at debug, so dev and staging see them and prod doesn't.
pub fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "blueprintx_schedule_facts=debug,tower_http=debug,info",
        Environment::Staging => "blueprintx_schedule_facts=debug,tower_http=info,info",
        Environment::Prod => "blueprintx_schedule_facts=info,tower_http=info,warn",
    }
}

pub fn init_logging(env: &Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(env).into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    // JSON lines in prod for the log shipper
    if env.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    }

    tracing::info!("Logging initialized for {:?} environment", env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        for env in [Environment::Dev, Environment::Staging, Environment::Prod] {
            assert!(EnvFilter::try_new(default_directives(&env)).is_ok());
        }
    }

    #[test]
    fn prod_hides_engine_debug() {
        assert!(default_directives(&Environment::Prod).starts_with("blueprintx_schedule_facts=info"));
        assert!(default_directives(&Environment::Dev).starts_with("blueprintx_schedule_facts=debug"));
    }
}
