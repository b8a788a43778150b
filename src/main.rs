//! fieldtrack main entrypoint.

use fieldtrack::run;
use fieldtrack::ui::messages::report_error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let filter = std::env::var("FIELDTRACK_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    println!();
    if let Err(e) = run().await {
        report_error(&e);
        std::process::exit(1);
    }
}
