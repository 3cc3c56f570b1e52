//! `keyscope probe` - run the four access checks on every selected table.

use crate::OutputFormat;
use crate::render;
use keyscope_core::KeyscopeConfig;
use keyscope_runtime::ProbeEvent;
use tokio::sync::mpsc;

pub async fn run(config: KeyscopeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut prober = super::connect(config)?.with_events(tx);

    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = render::progress_line(&event) {
                eprintln!("{}", line);
            }
            if let ProbeEvent::Residue { table, record } = &event {
                eprintln!("  ! probe row left behind in '{}': {}", table, record);
            }
        }
    });

    let result = prober.run().await;
    // closes the channel so the progress task finishes
    drop(prober);
    let _ = progress.await;
    let tables = result?;

    match format {
        OutputFormat::Text => print!("{}", render::access_table(&tables)),
        OutputFormat::Json => println!("{}", render::access_json(&tables)?),
    }
    Ok(())
}
