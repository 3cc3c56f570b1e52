//! `keyscope sample --table <name>` - show a generated record without sending it.

use keyscope_core::KeyscopeConfig;
use serde_json::Value;

pub async fn run(mut config: KeyscopeConfig, table: &str) -> anyhow::Result<()> {
    // discovery only needs the one table
    config.probe.include = vec![table.to_string()];
    config.probe.exclude.clear();

    let mut prober = super::connect(config)?;
    let tables = prober.discover().await?;
    let Some(descriptor) = tables.first() else {
        anyhow::bail!("Table '{}' not found in schema", table);
    };

    let record = prober.sample(descriptor);
    println!("{}", serde_json::to_string_pretty(&Value::Object(record))?);
    Ok(())
}
