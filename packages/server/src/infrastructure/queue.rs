//! Bounded, idempotently closable outbound queue.
//!
//! Many producers (broadcasts from other connections) push into the queue of
//! one connection; a single writer task drains it to the socket. Producers
//! take shared access on the lock and closing takes exclusive access, so no
//! producer can push into a channel that is being torn down.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;

/// Default per-connection queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

#[derive(Debug)]
pub struct SafeQueue<T> {
    /// `None` once closed.
    sender: RwLock<Option<mpsc::Sender<T>>>,
    /// Cancelled at the start of `close` so that producers blocked on a full
    /// channel release their shared access.
    closing: CancellationToken,
}

impl<T: Send> SafeQueue<T> {
    /// Create a queue and the receiving end for its single consumer.
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let queue = Self {
            sender: RwLock::new(Some(tx)),
            closing: CancellationToken::new(),
        };
        (Arc::new(queue), rx)
    }

    /// Best-effort enqueue.
    ///
    /// Waits while the queue is full. Returns `false` without touching the
    /// channel when the queue is (or becomes) closed, or when the consumer is
    /// gone. Never fails.
    pub async fn send(&self, item: T) -> bool {
        let guard = self.sender.read().await;
        let Some(tx) = guard.as_ref() else {
            return false;
        };

        tokio::select! {
            biased;
            _ = self.closing.cancelled() => false,
            result = tx.send(item) => result.is_ok(),
        }
    }

    /// Close the queue. Safe to call any number of times, concurrently with
    /// `send`. Items already enqueued are still delivered to the consumer.
    pub async fn close(&self) {
        self.closing.cancel();
        let mut guard = self.sender.write().await;
        guard.take();
    }

    pub fn is_closed(&self) -> bool {
        self.closing.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_send_then_receive_in_order() {
        // テスト項目: 送信した順に受信できる
        // given (前提条件):
        let (queue, mut rx) = SafeQueue::new(4);

        // when (操作):
        assert!(queue.send(1).await);
        assert!(queue.send(2).await);

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test]
    async fn test_send_after_close_is_noop() {
        // テスト項目: Close 後の Send はエラーもパニックもなく何もしない
        // given (前提条件):
        let (queue, mut rx) = SafeQueue::new(4);
        queue.send("before").await;

        // when (操作):
        queue.close().await;
        let delivered = queue.send("after").await;

        // then (期待する結果): Close 前のデータのみ届き、その後チャンネルは終端する
        assert!(!delivered);
        assert!(queue.is_closed());
        assert_eq!(rx.recv().await, Some("before"));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_close_twice_is_safe() {
        // テスト項目: Close を 2 回呼んでも安全
        let (queue, mut rx) = SafeQueue::<u8>::new(1);

        queue.close().await;
        queue.close().await;

        assert!(queue.is_closed());
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_close_releases_sender_blocked_on_full_queue() {
        // テスト項目: キューが満杯で待機中の Send は Close によって解放される
        // given (前提条件): 容量 1 のキューを埋め、2 件目の送信を待機させる
        let (queue, _rx) = SafeQueue::new(1);
        assert!(queue.send(1).await);
        let blocked = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.send(2).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!blocked.is_finished());

        // when (操作):
        tokio::time::timeout(Duration::from_secs(1), queue.close())
            .await
            .expect("close should not deadlock");

        // then (期待する結果):
        let delivered = tokio::time::timeout(Duration::from_secs(1), blocked)
            .await
            .expect("blocked sender should be released")
            .unwrap();
        assert!(!delivered);
    }

    #[tokio::test]
    async fn test_send_after_consumer_dropped_is_noop() {
        // テスト項目: 受信側が破棄された後の Send も失敗せず false を返す
        let (queue, rx) = SafeQueue::new(2);
        drop(rx);

        assert!(!queue.send(7).await);
    }

    #[tokio::test]
    async fn test_debug_output_reports_state() {
        // テスト項目: Debug 表示でキューの状態を確認できる
        let (queue, _rx) = SafeQueue::<String>::new(1);
        queue.close().await;

        let text = format!("{queue:?}");

        assert!(text.contains("SafeQueue"));
        assert!(text.contains("None"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_senders_racing_close() {
        // テスト項目: 多数の並行 Send と 1 つの Close が競合してもパニックしない
        // given (前提条件):
        const SENDERS: usize = 64;
        const PER_SENDER: usize = 200;
        let (queue, mut rx) = SafeQueue::new(DEFAULT_QUEUE_CAPACITY);

        let consumer = tokio::spawn(async move {
            let mut received = 0usize;
            while rx.recv().await.is_some() {
                received += 1;
            }
            received
        });

        let mut senders = Vec::with_capacity(SENDERS);
        for s in 0..SENDERS {
            let queue = queue.clone();
            senders.push(tokio::spawn(async move {
                let mut delivered = 0usize;
                for i in 0..PER_SENDER {
                    if queue.send(s * PER_SENDER + i).await {
                        delivered += 1;
                    }
                    if i % 16 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
                delivered
            }));
        }

        // when (操作): 送信の途中で Close する
        tokio::time::sleep(Duration::from_millis(2)).await;
        queue.close().await;

        // then (期待する結果): 全タスクが正常終了し、届いた件数が一致する
        let mut delivered = 0usize;
        for sender in senders {
            delivered += sender.await.expect("sender panicked");
        }
        let received = consumer.await.expect("consumer panicked");
        assert_eq!(received, delivered);
        assert!(delivered <= SENDERS * PER_SENDER);
        assert!(!queue.send(0).await);
    }
}
