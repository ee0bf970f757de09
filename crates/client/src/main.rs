use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixelwall_client::prelude::*;
use tracing::{error, info};

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every stored pixel as JSON
    List,
    /// Print the pixel at a coordinate
    Get {
        #[arg(allow_negative_numbers = true)]
        x: i64,
        #[arg(allow_negative_numbers = true)]
        y: i64,
    },
    /// Paint a block with a hex color, or `transparent` to clear it
    Paint {
        #[arg(allow_negative_numbers = true)]
        x: i64,
        #[arg(allow_negative_numbers = true)]
        y: i64,
        color: String,
        /// Turn a lost create race into an update instead of failing
        #[arg(long)]
        refetch_on_conflict: bool,
    },
    /// Poll the wall and redraw it whenever it changes
    Watch {
        #[arg(long, default_value_t = 21)]
        width: u32,
        #[arg(long, default_value_t = 6)]
        height: u32,
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pixelwall", about = "Talks to a shared pixel wall")]
struct Arguments {
    /// API root; falls back to $PIXELWALL_API, then the local default
    #[arg(long)]
    api: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Arguments::parse();
    let client = match args.api {
        Some(api) => WallClient::new(api),
        None => WallClient::from_env(),
    };
    info!("Using pixel API at {}", client.base());

    match args.command {
        Commands::List => {
            let pixels = client.list().await.context("listing pixels")?;
            println!("{}", serde_json::to_string_pretty(&pixels)?);
        }
        Commands::Get { x, y } => match client.get(x, y).await.context("getting pixel")? {
            Some(pixel) => println!("{}", serde_json::to_string_pretty(&pixel)?),
            None => println!("({}, {}) is unset", x, y),
        },
        Commands::Paint {
            x,
            y,
            color,
            refetch_on_conflict,
        } => {
            let target: Paint = color.parse()?;
            let policy = if refetch_on_conflict {
                ConflictPolicy::RefetchAndUpdate
            } else {
                ConflictPolicy::Surface
            };
            match paint(&client, x, y, &target, policy).await? {
                PaintOutcome::Created(pixel) => println!("created {} at ({}, {})", pixel.id, x, y),
                PaintOutcome::Updated(pixel) => println!("updated {} to {}", pixel.id, pixel.color),
                PaintOutcome::Deleted => println!("cleared ({}, {})", x, y),
                PaintOutcome::Unchanged => println!("({}, {}) was already clear", x, y),
            }
        }
        Commands::Watch {
            width,
            height,
            interval_ms,
        } => {
            let grid = Grid { width, height };
            let sync = PollingSynchronizer::new(client, grid, Duration::from_millis(interval_ms));
            tokio::select! {
                _ = watch(sync) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }
    Ok(())
}

async fn watch(mut sync: impl WallSynchronizer) {
    let mut shown: Option<WallSnapshot> = None;
    loop {
        match sync.next_snapshot().await {
            Ok(snapshot) => {
                if shown.as_ref() != Some(&snapshot) {
                    print!("\x1b[2J\x1b[H{}", render_text(&snapshot));
                    println!("{} blocks painted", snapshot.painted());
                    shown = Some(snapshot);
                }
            }
            Err(e) => error!("error getting all pixels: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_interval_must_be_positive() {
        assert!(Arguments::try_parse_from(["pixelwall", "watch", "--interval-ms", "0"]).is_err());
        let args = Arguments::try_parse_from(["pixelwall", "watch", "--interval-ms", "5"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Watch {
                interval_ms: 5,
                ..
            }
        ));
    }
}
