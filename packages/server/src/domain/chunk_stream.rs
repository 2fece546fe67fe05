//! Generation backend port.
//!
//! A backend turns a question into a lazy, finite, non-restartable stream of
//! text fragments. The stream ends normally or yields one error.

use std::{pin::Pin, time::Duration};

use futures_util::stream::{Stream, StreamExt};

use super::error::GenerationError;

/// Stream of generated text fragments
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// Text generation backend
pub trait TextGenerator: Send + Sync {
    /// Open a chunk stream for `question`. Nothing is requested until the
    /// stream is first polled.
    fn generate(&self, question: &str) -> ChunkStream;
}

/// Bound every pull on `inner` by `limit`.
///
/// The returned stream ends after the first error, whether produced by the
/// backend or by an expired pull.
pub fn with_pull_timeout(mut inner: ChunkStream, limit: Duration) -> ChunkStream {
    Box::pin(async_stream::stream! {
        loop {
            match tokio::time::timeout(limit, inner.next()).await {
                Ok(Some(Ok(chunk))) => yield Ok(chunk),
                Ok(Some(Err(e))) => {
                    yield Err(e);
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    yield Err(GenerationError::Timeout(limit));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn test_pull_timeout_passes_chunks_through() {
        // テスト項目: 期限内に届いたチャンクはそのまま順番に流れる
        // given (前提条件):
        let inner: ChunkStream = Box::pin(stream::iter(vec![
            Ok("a".to_string()),
            Ok("b".to_string()),
        ]));

        // when (操作):
        let items: Vec<_> = with_pull_timeout(inner, Duration::from_secs(1))
            .collect()
            .await;

        // then (期待する結果):
        assert_eq!(items, vec![Ok("a".to_string()), Ok("b".to_string())]);
    }

    #[tokio::test]
    async fn test_pull_timeout_stops_after_backend_error() {
        // テスト項目: バックエンドのエラー以降の要素は流れない
        // given (前提条件):
        let inner: ChunkStream = Box::pin(stream::iter(vec![
            Ok("a".to_string()),
            Err(GenerationError::Backend("quota".to_string())),
            Ok("never".to_string()),
        ]));

        // when (操作):
        let items: Vec<_> = with_pull_timeout(inner, Duration::from_secs(1))
            .collect()
            .await;

        // then (期待する結果):
        assert_eq!(
            items,
            vec![
                Ok("a".to_string()),
                Err(GenerationError::Backend("quota".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_pull_timeout_expires_on_stalled_backend() {
        // テスト項目: 応答しないバックエンドはタイムアウトエラーで打ち切られる
        // given (前提条件):
        let inner: ChunkStream = Box::pin(
            stream::iter(vec![Ok("a".to_string())])
                .chain(stream::pending::<Result<String, GenerationError>>()),
        );

        // when (操作):
        let items: Vec<_> = with_pull_timeout(inner, Duration::from_millis(50))
            .collect()
            .await;

        // then (期待する結果):
        assert_eq!(
            items,
            vec![
                Ok("a".to_string()),
                Err(GenerationError::Timeout(Duration::from_millis(50))),
            ]
        );
    }
}
