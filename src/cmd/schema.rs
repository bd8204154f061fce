//! Schema command: export JSON Schemas for input documents.

use anyhow::{bail, Context, Result};
use model_erd::json_schema::{all_schemas, get_schema, schema_names};
use std::fs;
use std::path::PathBuf;

pub fn run(name: Option<String>, output_dir: Option<PathBuf>) -> Result<()> {
    let schemas = match name {
        Some(name) => match get_schema(&name) {
            Some(schema) => vec![(name, schema)],
            None => bail!(
                "Unknown schema: {}. Valid options: {}",
                name,
                schema_names().join(", ")
            ),
        },
        None => all_schemas()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                fs::write(&path, serde_json::to_string_pretty(schema)? + "\n")?;
                eprintln!("Schema written to: {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&schemas[0].1)?);
        }
        None => {
            let mut combined = serde_json::Map::new();
            for (name, schema) in schemas {
                combined.insert(name, serde_json::to_value(schema)?);
            }
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
    }

    Ok(())
}
