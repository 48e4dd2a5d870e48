//! Connect command implementation.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use worldsync_engine::{ClientConfig, ClientReport, MemoryWorld, PumpExit, SyncClient, Transport};
use worldsync_protocol::Position;

/// Session summary printed when the client stops.
#[derive(Debug, Serialize)]
pub struct ConnectSummary {
    /// Server address.
    pub url: String,
    /// Local entity identifier.
    pub id: String,
    /// Why the session ended.
    pub exit: String,
    /// Frames received.
    pub frames: u64,
    /// Batches applied.
    pub batches: u64,
    /// Frames skipped as undecodable.
    pub decode_failures: u64,
    /// Remote entities created.
    pub created: u64,
    /// Remote position updates applied.
    pub updated: u64,
    /// Self-echo snapshots dropped.
    pub skipped_self: u64,
    /// Position messages sent, if publishing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<u64>,
    /// Final remote entity positions.
    pub entities: Vec<EntityRow>,
}

/// One remote entity in the summary.
#[derive(Debug, Serialize)]
pub struct EntityRow {
    /// Entity identifier.
    pub id: String,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

/// Parses `x,y,z` into a position.
pub fn parse_position(s: &str) -> Result<Position, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;

    match parts.as_slice() {
        [x, y, z] => {
            let position = Position::new(*x, *y, *z);
            if position.is_finite() {
                Ok(position)
            } else {
                Err("coordinates must be finite".into())
            }
        }
        _ => Err(format!("expected x,y,z, got {} values", parts.len())),
    }
}

/// Runs the connect command.
pub fn run(
    config: ClientConfig,
    position: Option<Position>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(session(config, position))?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            print_text_output(&summary);
        }
    }

    Ok(())
}

async fn session(
    config: ClientConfig,
    position: Option<Position>,
) -> Result<ConnectSummary, Box<dyn std::error::Error>> {
    let world = Arc::new(match position {
        Some(position) => MemoryWorld::with_local(position),
        None => MemoryWorld::new(),
    });

    let url = config.server_url.clone();
    let id = config.local_id.clone();

    let client = SyncClient::connect(config, Arc::clone(&world)).await?;
    let transport = Arc::clone(client.transport());
    let handle = client.start();
    let cancel = handle.cancellation_token();

    let wait = handle.wait();
    tokio::pin!(wait);

    let report = tokio::select! {
        report = &mut wait => report?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, closing connection");
            cancel.cancel();
            transport.close();
            wait.await?
        }
    };

    Ok(summarize(url, id, &report, &world))
}

fn summarize(url: String, id: String, report: &ClientReport, world: &MemoryWorld) -> ConnectSummary {
    let exit = match &report.pump.exit {
        PumpExit::PeerClosed => "closed by server".to_string(),
        PumpExit::TransportFailure(e) => format!("transport failure: {e}"),
        PumpExit::Closed => "closed".to_string(),
        PumpExit::Cancelled => "interrupted".to_string(),
    };

    ConnectSummary {
        url,
        id,
        exit,
        frames: report.pump.frames,
        batches: report.pump.batches,
        decode_failures: report.pump.decode_failures,
        created: report.pump.reconciled.created,
        updated: report.pump.reconciled.updated,
        skipped_self: report.pump.reconciled.skipped_self,
        published: report.publisher.map(|p| p.sent),
        entities: world
            .entities()
            .into_iter()
            .map(|e| EntityRow {
                id: e.id,
                x: e.position.x,
                y: e.position.y,
                z: e.position.z,
            })
            .collect(),
    }
}

fn print_text_output(summary: &ConnectSummary) {
    println!("WorldSync Session");
    println!("=================");
    println!();
    println!("Server: {}", summary.url);
    println!("Local:  {}", summary.id);
    println!("Exit:   {}", summary.exit);
    println!();
    println!("Inbound:");
    println!("  Frames:          {}", summary.frames);
    println!("  Batches:         {}", summary.batches);
    println!("  Decode failures: {}", summary.decode_failures);
    println!();
    println!("Reconciled:");
    println!("  Created:      {}", summary.created);
    println!("  Updated:      {}", summary.updated);
    println!("  Self skipped: {}", summary.skipped_self);

    if let Some(published) = summary.published {
        println!();
        println!("Outbound:");
        println!("  Published: {published}");
    }

    if !summary.entities.is_empty() {
        println!();
        println!("Entities:");
        for entity in &summary.entities {
            println!(
                "  {} ({}, {}, {})",
                entity.id, entity.x, entity.y, entity.z
            );
        }
    }
}
