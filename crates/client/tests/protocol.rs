use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pixelwall_client::prelude::*;
use pixelwall_store::prelude::{BackingStore, HexColor, Pixel, PixelId, RamBackingStore};
use tokio::net::TcpListener;

async fn spawn_server() -> WallClient {
    let store: Arc<dyn BackingStore> = Arc::new(RamBackingStore::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, pixelwall_server::app(store))
            .await
            .unwrap();
    });
    WallClient::new(format!("http://{}/api/pixels/", addr))
}

fn color(s: &str) -> Paint {
    s.parse().unwrap()
}

/// Answers its first lookup with "unset", as if another painter claimed the block right after
/// we looked.
struct StaleFirstLookup {
    inner: WallClient,
    lied: AtomicBool,
}

impl PixelApi for StaleFirstLookup {
    async fn list(&self) -> Result<Vec<Pixel>, ClientError> {
        self.inner.list().await
    }

    async fn get(&self, x: i64, y: i64) -> Result<Option<Pixel>, ClientError> {
        if !self.lied.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.get(x, y).await
    }

    async fn create(&self, x: i64, y: i64, color: &HexColor) -> Result<Pixel, ClientError> {
        self.inner.create(x, y, color).await
    }

    async fn update(&self, id: &PixelId, color: &HexColor) -> Result<Pixel, ClientError> {
        self.inner.update(id, color).await
    }

    async fn delete(&self, id: &PixelId) -> Result<(), ClientError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn test_paint_walks_the_decision_table() {
    let client = spawn_server().await;
    let policy = ConflictPolicy::Surface;

    let created = match paint(&client, 3, 4, &color("#FF0000"), policy).await.unwrap() {
        PaintOutcome::Created(pixel) => pixel,
        other => panic!("expected a create, got {:?}", other),
    };
    assert_eq!(created.color.as_str(), "#FF0000");

    match paint(&client, 3, 4, &color("#00FF00"), policy).await.unwrap() {
        PaintOutcome::Updated(pixel) => {
            assert_eq!(pixel.id, created.id);
            assert_eq!(pixel.color.as_str(), "#00FF00");
        }
        other => panic!("expected an update, got {:?}", other),
    }

    assert_eq!(
        paint(&client, 3, 4, &Paint::Unset, policy).await.unwrap(),
        PaintOutcome::Deleted
    );
    assert!(client.get(3, 4).await.unwrap().is_none());
    assert_eq!(
        paint(&client, 3, 4, &Paint::Unset, policy).await.unwrap(),
        PaintOutcome::Unchanged
    );
}

#[tokio::test]
async fn test_lost_race_is_surfaced() {
    let client = spawn_server().await;
    let winner = client.create(0, 0, &"#111".parse().unwrap()).await.unwrap();

    let loser = StaleFirstLookup {
        inner: client.clone(),
        lied: AtomicBool::new(false),
    };
    let result = paint(&loser, 0, 0, &color("#222"), ConflictPolicy::Surface).await;
    assert!(matches!(result, Err(ClientError::Conflict(_))));
    assert_eq!(client.get(0, 0).await.unwrap(), Some(winner));
}

#[tokio::test]
async fn test_lost_race_becomes_update() {
    let client = spawn_server().await;
    let winner = client.create(0, 0, &"#111".parse().unwrap()).await.unwrap();

    let loser = StaleFirstLookup {
        inner: client.clone(),
        lied: AtomicBool::new(false),
    };
    let outcome = paint(&loser, 0, 0, &color("#222"), ConflictPolicy::RefetchAndUpdate)
        .await
        .unwrap();
    match outcome {
        PaintOutcome::Updated(pixel) => {
            assert_eq!(pixel.id, winner.id);
            assert_eq!(pixel.color.as_str(), "#222");
        }
        other => panic!("expected an update, got {:?}", other),
    }
    assert_eq!(client.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_client_errors() {
    let client = spawn_server().await;
    let unknown = PixelId::from("ffffffffffffffffffffffff");
    assert!(matches!(
        client.update(&unknown, &"#fff".parse().unwrap()).await,
        Err(ClientError::NotFound(_))
    ));
    assert!(matches!(
        client.delete(&unknown).await,
        Err(ClientError::NotFound(_))
    ));

    client.create(1, 1, &"#fff".parse().unwrap()).await.unwrap();
    assert!(matches!(
        client.create(1, 1, &"#000".parse().unwrap()).await,
        Err(ClientError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_polling_sees_other_painters() {
    let client = spawn_server().await;
    let grid = Grid {
        width: 4,
        height: 4,
    };
    let mut sync = PollingSynchronizer::new(client.clone(), grid, Duration::from_millis(20));

    let first = sync.next_snapshot().await.unwrap();
    assert_eq!(first, WallSnapshot::empty(grid));

    paint(&client, 2, 3, &color("#abc"), ConflictPolicy::Surface)
        .await
        .unwrap();
    paint(&client, 10, 10, &color("#abc"), ConflictPolicy::Surface)
        .await
        .unwrap();

    let second = sync.next_snapshot().await.unwrap();
    assert_eq!(second.painted(), 1);
    assert_eq!(second.color_at(2, 3).unwrap().as_str(), "#abc");
    assert_eq!(second, first.with_paint(2, 3, &color("#abc")));
}

#[tokio::test]
async fn test_polling_with_zero_period() {
    let client = spawn_server().await;
    let mut sync = PollingSynchronizer::new(client.clone(), Grid::default(), Duration::ZERO);

    client.create(0, 0, &"#fff".parse().unwrap()).await.unwrap();
    for _ in 0..3 {
        assert_eq!(sync.next_snapshot().await.unwrap().painted(), 1);
    }
}
