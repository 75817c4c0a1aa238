//! tinsel-server: claim ledger with live fan-out.
//!
//! ## Configuration
//! - `--config <path>` or TINSEL_CONFIG: YAML config file
//! - TINSEL__SECTION__KEY: per-setting overrides (e.g. TINSEL__SERVER__PORT)
//! - TINSEL_LOG: log filter (default: info)
//! - TINSEL_LOG_FORMAT: `json` for structured output

use tracing::{error, info};

use tinsel::config::Config;
use tinsel::runtime::Runtime;
use tinsel::utils::bootstrap::{init_tracing, shutdown_signal};

fn config_path_arg() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = match Config::load(config_path_arg().as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    info!(
        address = %config.server.bind_address(),
        storage = %config.storage.path,
        email = config.email.enabled,
        "Starting tinsel-server"
    );

    let runtime = Runtime::build(config).await?;
    runtime.run(shutdown_signal()).await?;

    Ok(())
}
