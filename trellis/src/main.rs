use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use args::{Args, Command};
use clap::Parser;
use config::Config;
use server::ServeConfig;
use spec::ApiSpec;

mod args;
mod logger;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(&args);

    if let Some(Command::Spec { source }) = &args.command {
        let spec = ApiSpec::from_dir(source)?;
        println!("{}", serde_json::to_string_pretty(&spec)?);

        return Ok(());
    }

    let config = args.config()?;

    if let Err(e) = server::serve(serve_config(&args, config)).await {
        log::error!("Server failed to start: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn serve_config(args: &Args, config: Config) -> ServeConfig {
    let listen_address = args
        .listen_address
        .or(config.server.listen_address)
        .unwrap_or(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 8000)));

    ServeConfig {
        listen_address,
        config,
        routes: routes::routes(),
    }
}
