//! Decode command implementation.

use std::io::Read;
use std::path::Path;
use worldsync_protocol::decode_batch;

/// Runs the decode command.
pub fn run(file: Option<&Path>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = match file {
        Some(path) => std::fs::read(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let batch = decode_batch(bytes.trim_ascii())?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        _ => {
            println!("Batch: {} snapshot(s)", batch.len());
            for (i, snapshot) in batch.iter().enumerate() {
                println!("  [{i}] {} {}", snapshot.id, snapshot.position);
            }
        }
    }

    Ok(())
}
