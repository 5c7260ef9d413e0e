use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use ebb_demo::routes::Router;
use ebb_demo::tcp_echo::serve_lines;
use ebb_http::connection::{HttpConnection, ServerOptions};
use tokio::net::TcpListener;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "ebb-demo")]
#[command(about = "Serve the ebb demo routes or a plain tcp line echo", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    #[arg(short, long, value_enum, default_value_t = Mode::Http)]
    mode: Mode,

    /// Max level of the log output
    #[arg(short, long, default_value_t = Level::INFO)]
    log_level: Level,

    /// Seconds a connection may wait for the next request head
    #[arg(long)]
    header_timeout: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// `/echo`, `/counter` and a default page
    Http,
    /// Echo every line back, close on `quit`
    TcpEcho,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(args.log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(addr = %args.addr, mode = ?args.mode, "start listening");
    let tcp_listener = match TcpListener::bind(args.addr).await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return Err(e.into());
        }
    };

    let mut options = ServerOptions::new();
    if let Some(secs) = args.header_timeout {
        options = options.with_header_timeout(Duration::from_secs(secs));
    }
    let handler = Arc::new(Router::new());

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        let handler = Arc::clone(&handler);
        let mode = args.mode;

        tokio::spawn(async move {
            let (reader, writer) = tcp_stream.into_split();
            let result: Result<(), Box<dyn Error + Send + Sync>> = match mode {
                Mode::Http => HttpConnection::with_options(reader, writer, options).process(handler).await.map_err(Into::into),
                Mode::TcpEcho => serve_lines(reader, writer).await.map_err(Into::into),
            };

            match result {
                Ok(()) => info!(%remote_addr, "finished process, connection shutdown"),
                Err(e) => error!(%remote_addr, "service has error, cause {}, connection shutdown", e),
            }
        });
    }
}
