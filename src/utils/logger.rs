use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Library plus binary targets; events from `main` carry the binary's name.
const CLI_VERBOSE: &str = "loki_control=debug,loki_ctl=debug,info";
const CLI_QUIET: &str = "loki_control=warn,loki_ctl=warn";
const DAEMON_VERBOSE: &str = "loki_control=debug,loki_daemon=debug,info";
const DAEMON_DEFAULT: &str = "loki_control=info,loki_daemon=info";

fn default_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

pub(crate) fn cli_directives(verbose: bool) -> &'static str {
    if verbose {
        CLI_VERBOSE
    } else {
        CLI_QUIET
    }
}

pub(crate) fn daemon_directives(verbose: bool) -> &'static str {
    if verbose {
        DAEMON_VERBOSE
    } else {
        DAEMON_DEFAULT
    }
}

pub fn init_cli_logger(verbose: bool) {
    let filter = default_filter(cli_directives(verbose));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

pub fn init_daemon_logger(verbose: bool, json: bool) {
    let filter = default_filter(daemon_directives(verbose));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        // journald / 日誌收集器使用 JSON 格式
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.compact())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_cover_binary_targets() {
        assert!(daemon_directives(false).contains("loki_daemon=info"));
        assert!(daemon_directives(true).contains("loki_daemon=debug"));
        assert!(cli_directives(false).contains("loki_ctl=warn"));
        assert!(cli_directives(true).contains("loki_ctl=debug"));
        for directives in [
            cli_directives(true),
            cli_directives(false),
            daemon_directives(true),
            daemon_directives(false),
        ] {
            assert!(directives.contains("loki_control="));
            assert!(directives.parse::<EnvFilter>().is_ok(), "{}", directives);
        }
    }
}
