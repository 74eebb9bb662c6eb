use std::{
    io::{self, Write},
    time::Instant,
};

use crate::{
    browser::ErrorBrowser, config::HarnessArgs, error::ClientError, orchestrator::Orchestrator,
};

/// Run the harness as configured on the command line.
pub async fn run_client(args: HarnessArgs) -> Result<(), ClientError> {
    let settings = args.settings()?;
    if settings.connections == 0 {
        return Ok(());
    }

    tracing::info!(
        "Starting {} connection(s) to {} ({} message(s) each, same start: {})",
        settings.connections,
        settings.addr,
        settings.messages_per_connection,
        settings.same_start
    );
    let orchestrator = Orchestrator::new(settings);

    if !args.test {
        let elapsed = orchestrator.run_load().await;
        if args.time {
            println!("{:.6}", elapsed.as_secs_f64());
        }
        return Ok(());
    }

    let start = Instant::now();
    let aggregator = orchestrator.run_validation().await;
    let elapsed = start.elapsed();

    {
        let mut stdout = io::stdout().lock();
        aggregator.write_report(&mut stdout, elapsed)?;
        stdout.flush()?;
    }

    if aggregator.failed() == 0 {
        return Ok(());
    }

    let mut errors = aggregator.into_errors();
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        let mut editor =
            rustyline::DefaultEditor::new().map_err(|e| io::Error::other(e.to_string()))?;
        ErrorBrowser::new(&mut errors).run(&mut editor, &mut io::stdout())
    })
    .await
    .map_err(io::Error::other)??;

    Ok(())
}
