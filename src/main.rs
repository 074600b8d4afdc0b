use clap::Parser;
use gatehouse::cli::{self, Cli};
use gatehouse::{Config, Logger, Router, Server, health, logging, middleware};
use http::Method;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), gatehouse::Error> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", cli::version_string());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;

    let dispatch = logging::dispatch(&config.log.level, config.log.format)?;
    if tracing::dispatcher::set_global_default(dispatch.clone()).is_err() {
        eprintln!("a global tracing subscriber was already installed");
    }
    info!(version = %cli::version_string(), "starting gatehouse");

    let router = Router::new()
        .on(Method::GET, "/healthz", health::liveness)
        .on(Method::GET, "/readyz", health::readiness);

    let app = middleware::init(Logger::new(dispatch)).wrap(router);
    Server::bind(config.server.addr).serve(app).await
}
