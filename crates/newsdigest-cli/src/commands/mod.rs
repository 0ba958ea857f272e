pub mod headlines;
pub mod serve;
pub mod summarize;

use std::io::Write;

use anyhow::Result;
use futures::StreamExt;

use newsdigest_core::SummaryStream;

/// Write each event to stdout as one JSON line, flushing as it arrives
pub(crate) async fn print_events(mut stream: SummaryStream) -> Result<()> {
    let total = stream.total_count();
    let mut failed = 0;

    while let Some(event) = stream.next().await {
        if !event.is_success() {
            failed += 1;
        }

        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer(&mut stdout, &event)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }

    tracing::info!("Streamed {} articles ({} failed)", total, failed);
    Ok(())
}
