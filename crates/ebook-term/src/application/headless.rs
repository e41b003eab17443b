use std::io::Write;
use std::path::Path;

use anyhow::bail;
use anyhow::Result;
use ebook_client::ControllerHandle;
use ebook_client::ControllerState;
use ebook_client::EbookBackend;
use ebook_client::SessionStatus;

use super::cli::HeadlessOptions;
use crate::infrastructure::downloads;

/// Lines of `next` that were not already at the end of `previous`. The server
/// log is a sliding window, so consecutive polls overlap.
fn unseen_lines<'a>(previous: &[String], next: &'a [String]) -> &'a [String] {
    for overlap in (1..=previous.len().min(next.len())).rev() {
        if previous[previous.len() - overlap..] == next[..overlap] {
            return &next[overlap..];
        }
    }

    return next;
}

struct Printer<W: Write> {
    out: W,
    client_printed: usize,
    server_seen: Vec<String>,
}

impl<W: Write> Printer<W> {
    fn new(out: W) -> Printer<W> {
        return Printer {
            out,
            client_printed: 0,
            server_seen: vec![],
        };
    }

    fn print(&mut self, state: &ControllerState) -> Result<()> {
        let client = state.logs.client();
        for entry in client.iter().skip(self.client_printed) {
            writeln!(self.out, "{entry}")?;
        }
        self.client_printed = client.len();

        if state.logs.server_visible() {
            let lines = state
                .logs
                .server()
                .iter()
                .map(|entry| entry.text.clone())
                .collect::<Vec<_>>();
            for line in unseen_lines(&self.server_seen, &lines) {
                writeln!(self.out, "[server] {line}")?;
            }
            self.server_seen = lines;
        }

        self.out.flush()?;
        return Ok(());
    }
}

/// Run one generation without the UI, printing progress to stdout.
pub async fn run(
    handle: ControllerHandle,
    backend: &dyn EbookBackend,
    output_dir: &Path,
    options: HeadlessOptions,
) -> Result<()> {
    let mut state_rx = handle.subscribe();
    let mut printer = Printer::new(std::io::stdout());

    if options.server_logs {
        handle.toggle_server_logs()?;
    }
    handle.start(&options.topic)?;

    let state = loop {
        if state_rx.changed().await.is_err() {
            bail!("Generation controller stopped before the ebook was generated");
        }

        let state = state_rx.borrow_and_update().clone();
        printer.print(&state)?;

        if state.status().is_settled() && !state.generating {
            break state;
        }
    };

    if state.status() == SessionStatus::Failed {
        let message = state
            .error
            .map(|error| error.message)
            .unwrap_or_default();
        bail!(message);
    }

    let Some(result) = state.result else {
        bail!("Generation finished without an ebook");
    };

    println!("Download: {}", backend.artifact_url(&result)?);

    if options.download {
        let path = downloads::save_artifact(backend, &result, output_dir).await?;
        println!("Saved to {}", path.display());
    }

    return Ok(());
}
