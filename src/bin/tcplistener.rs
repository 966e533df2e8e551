use clap::Parser;
use httpline::http::{EofPolicy, ReaderConfig};
use httpline::net::{self, ListenerConfig, DEFAULT_ADDR};
use std::process::ExitCode;
use std::time::Duration;

/// Print the request line of every HTTP request received over TCP
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_ADDR)]
    addr: String,

    /// Read deadline per connection in seconds, 0 waits forever
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Accept connections that close before the request line is complete
    #[arg(long)]
    lenient_eof: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let eof_policy = if args.lenient_eof {
        EofPolicy::Complete
    } else {
        EofPolicy::Error
    };
    let read_timeout = (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs));

    let config = ListenerConfig::new()
        .addr(args.addr)
        .read_timeout(read_timeout)
        .reader(ReaderConfig::new().eof_policy(eof_policy));

    let listener = match net::bind(&config) {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("failed to start listener on {}: {}", config.addr, e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("listening on {}", config.addr);

    net::serve(listener, &config, |_peer, request| match request.request_line() {
        Some(line) => println!(
            "Request line:\n- Method: {}\n- Target: {}\n- Version: {}",
            line.method(),
            line.target(),
            line.http_version()
        ),
        None => println!("Connection closed before a request line was sent"),
    })
}
