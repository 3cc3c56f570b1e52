//! `keyscope schema` - list the tables the service describes.

use crate::render;
use keyscope_core::KeyscopeConfig;

pub async fn run(config: KeyscopeConfig) -> anyhow::Result<()> {
    let prober = super::connect(config)?;
    let tables = prober.discover().await?;

    if tables.is_empty() {
        println!("No tables visible to this key.");
        return Ok(());
    }
    print!("{}", render::schema_listing(&tables));
    Ok(())
}
