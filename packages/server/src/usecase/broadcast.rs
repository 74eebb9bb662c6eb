//! Fan-out of one encoded message to every registered connection.

use futures_util::future::join_all;

use crate::domain::ConnectionRepository;

/// Enqueue `payload` to every connection present in a registry snapshot.
///
/// Enqueues run as independent futures polled together, so a recipient whose
/// queue is full only holds up its own delivery. Returns the number of queues
/// that accepted the payload.
pub async fn broadcast(repository: &dyn ConnectionRepository, payload: &str) -> usize {
    let members = repository.snapshot().await;
    if members.is_empty() {
        return 0;
    }

    let deliveries = members.iter().map(|(id, queue)| {
        let payload = payload.to_string();
        async move {
            let delivered = queue.send(payload).await;
            if !delivered {
                tracing::trace!("Skipped closed queue of '{}'", id);
            }
            delivered
        }
    });

    join_all(deliveries)
        .await
        .into_iter()
        .filter(|delivered| *delivered)
        .count()
}
