use clap::Parser;

use linktrace::cli::{Cli, Commands};
use linktrace::config::{LoggingConfig, get_config, init_config};
use linktrace::errors::LinktraceError;
use linktrace::runtime::modes;
use linktrace::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_config(cli.config.as_deref());
    let config = get_config();

    let command = cli.command.unwrap_or(Commands::Serve);

    // CLI 模式默认只输出警告，RUST_LOG 仍然优先
    let logging = if command.is_server() {
        config.logging.clone()
    } else {
        LoggingConfig {
            level: "warn".to_string(),
            file: None,
            ..config.logging.clone()
        }
    };
    let log_guard = init_logging(&logging);

    let result = match command {
        Commands::Serve => modes::run_server().await,
        other => modes::run_cli(other).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<LinktraceError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("Error: {:#}", e),
        }
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
