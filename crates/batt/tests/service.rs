//! A small service wired together from configuration, using only the facade.

use batt::prelude::*;
use batt::tasks::TaskError;
use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Default, Bind)]
#[bind(crate = "::batt::extract")]
struct CreateNote {
    #[bind(params = "board")]
    board: String,
    #[bind(json = "text")]
    text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    board: String,
    text: String,
    author: String,
}

#[derive(Debug, Clone)]
struct Member {
    name: String,
}

#[derive(Debug, thiserror::Error)]
#[error("indexer busy")]
struct IndexerBusy;

struct NoteService {
    cache: Cache,
    retrier: Retrier,
    policy: RetryPolicy,
    index_calls: Arc<AtomicU32>,
}

#[derive(Debug, thiserror::Error)]
enum NoteError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Task(#[from] TaskError),
}

impl BusinessLogic<CreateNote, Note> for NoteService {
    type Error = NoteError;

    async fn execute(&self, ctx: RequestContext, req: CreateNote) -> Result<Note, NoteError> {
        let author = auth_user::<Member>(&ctx)
            .map(|m| m.name.clone())
            .ok_or_else(|| AppError::authentication("no member"))?;
        let note = Note {
            board: req.board,
            text: req.text,
            author,
        };
        self.cache
            .set_json(&format!("note:{}", note.board), &note, Ttl::Forever)
            .await?;

        // Indexing fails once, then succeeds on the retry.
        let index_calls = Arc::clone(&self.index_calls);
        let handle = self
            .retrier
            .process(
                "index-note",
                move || {
                    let n = index_calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n == 0 {
                            Err(IndexerBusy)
                        } else {
                            Ok(())
                        }
                    }
                },
                self.policy,
            )
            .await?;
        handle.join().await?;

        Ok(note)
    }
}

fn load_config() -> BattConfig {
    ConfigLoader::new()
        .with_string(
            r#"
            [tasks]
            max_workers = 2
            max_attempts = 3
            retry_delay_ms = 1
            "#,
            "toml",
        )
        .unwrap()
        .load()
        .unwrap()
}

fn create_request(token: Option<&str>) -> Request {
    let mut builder = http::Request::builder()
        .method(http::Method::POST)
        .uri("/boards/general/notes")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let mut request = builder
        .body(Bytes::from_static(br#"{"text":"ship it"}"#))
        .unwrap();
    request
        .extensions_mut()
        .insert(Params::new().with("board", "general"));
    request
}

#[tokio::test]
async fn test_note_service_end_to_end() {
    let config = load_config();
    let cache = Cache::in_memory();
    let pool = WorkerPool::new(config.tasks.pool_config()).unwrap();
    let index_calls = Arc::new(AtomicU32::new(0));

    let service = NoteService {
        cache: cache.clone(),
        retrier: Retrier::new(pool.clone()),
        policy: config.tasks.retry_policy().unwrap(),
        index_calls: Arc::clone(&index_calls),
    };

    let chain = Chain::new(handler_with_config(
        service,
        StatusCode::CREATED,
        config.binding,
    ))
    .with(AuthBearer::new(|_ctx: RequestContext, token: String| async move {
        (token == "s3cret").then(|| Member {
            name: "grace".to_string(),
        })
    }));

    let response = chain.respond(create_request(Some("s3cret"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let note: Note = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(
        note,
        Note {
            board: "general".to_string(),
            text: "ship it".to_string(),
            author: "grace".to_string(),
        }
    );

    let cached: Note = cache.get_json("note:general").await.unwrap();
    assert_eq!(cached, note);
    assert_eq!(index_calls.load(Ordering::SeqCst), 2);

    pool.shutdown().await;
}

#[tokio::test]
async fn test_note_service_requires_token() {
    let config = load_config();
    let pool = WorkerPool::new(config.tasks.pool_config()).unwrap();
    let index_calls = Arc::new(AtomicU32::new(0));

    let service = NoteService {
        cache: Cache::in_memory(),
        retrier: Retrier::new(pool.clone()),
        policy: RetryPolicy::once(),
        index_calls: Arc::clone(&index_calls),
    };

    let chain = Chain::new(handler(service, StatusCode::CREATED)).with(AuthBearer::new(
        |_ctx: RequestContext, _token: String| async move { None::<Member> },
    ));

    let missing = chain.respond(create_request(None)).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let rejected = chain.respond(create_request(Some("wrong"))).await;
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(index_calls.load(Ordering::SeqCst), 0);
    pool.shutdown().await;
}
