//! Typed watch streams
//!
//! A watch on the typed broker is a forwarding task sitting between the
//! store's raw subscription and the caller. Raw events are republished in
//! store order with the serializer attached; the payload is decoded only
//! when the consumer calls `decode`.
//!
//! The output channel has capacity 1, so a slow consumer holds back the
//! forwarder rather than letting events pile up twice. The forwarder ends
//! when the raw subscription closes (store closed) or the consumer drops
//! the stream; dropping the stream also aborts the task.

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use agentkv_core::{
    ChangeKind, Error, RawWatchEvent, RawWatchReceiver, Result, Revision, Serializer,
};

/// One change notification with deferred decoding
#[derive(Debug, Clone)]
pub struct TypedWatchEvent<S> {
    key: String,
    value: Option<Vec<u8>>,
    revision: Revision,
    kind: ChangeKind,
    serializer: S,
}

impl<S: Serializer> TypedWatchEvent<S> {
    fn from_raw(raw: RawWatchEvent, serializer: S, scope: &str) -> Self {
        let key = match raw.key.strip_prefix(scope) {
            Some(rest) if !scope.is_empty() => rest.to_string(),
            _ => raw.key,
        };
        TypedWatchEvent {
            key,
            value: raw.value,
            revision: raw.revision,
            kind: raw.kind,
            serializer,
        }
    }

    /// Changed key, relative to the watching broker's scope
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn is_delete(&self) -> bool {
        self.kind == ChangeKind::Delete
    }

    /// Decode the new value
    ///
    /// # Errors
    ///
    /// `Error::Decode` for delete events (they carry no value) or when the
    /// bytes do not fit `M`.
    pub fn decode<M: DeserializeOwned>(&self) -> Result<M> {
        let data = self
            .value
            .as_deref()
            .ok_or_else(|| Error::decode("delete event carries no value").with_key(&self.key))?;
        self.serializer
            .unmarshal(data)
            .map_err(|e: Error| e.with_key(&self.key))
    }
}

/// Stream of typed change notifications
///
/// `recv` returns `None` once the subscription has ended.
#[derive(Debug)]
pub struct TypedWatchStream<S> {
    rx: mpsc::Receiver<TypedWatchEvent<S>>,
    task: JoinHandle<()>,
}

impl<S: Serializer> TypedWatchStream<S> {
    /// Wait for the next event
    pub async fn recv(&mut self) -> Option<TypedWatchEvent<S>> {
        self.rx.recv().await
    }

    /// Take the next event if one is ready
    pub fn try_recv(&mut self) -> Option<TypedWatchEvent<S>> {
        self.rx.try_recv().ok()
    }

    /// End the subscription
    pub fn cancel(&mut self) {
        self.task.abort();
        self.rx.close();
    }

    /// Whether the forwarding task has stopped
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<S> Drop for TypedWatchStream<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the forwarding task for a raw subscription
pub(crate) fn forward<S: Serializer>(
    mut raw: RawWatchReceiver,
    serializer: S,
    scope: String,
) -> TypedWatchStream<S> {
    let (tx, rx) = mpsc::channel(1);
    let task = tokio::spawn(async move {
        while let Some(event) = raw.recv().await {
            trace!(
                target: "agentkv::watch",
                key = %event.key,
                kind = %event.kind,
                "Forwarding event"
            );
            let typed = TypedWatchEvent::from_raw(event, serializer.clone(), &scope);
            if tx.send(typed).await.is_err() {
                debug!(target: "agentkv::watch", scope = %scope, "Consumer gone, stopping watch");
                return;
            }
        }
        debug!(target: "agentkv::watch", scope = %scope, "Raw subscription closed");
    });
    TypedWatchStream { rx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkv_core::MsgPackSerializer;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn test_forward_preserves_order() {
        let (raw_tx, raw_rx) = unbounded_channel();
        let s = MsgPackSerializer;
        for i in 1..=3u32 {
            raw_tx
                .send(RawWatchEvent::put(
                    format!("a/k{i}"),
                    s.marshal(&i).unwrap(),
                    Revision(i as i64),
                ))
                .unwrap();
        }
        drop(raw_tx);

        let mut stream = forward(raw_rx, s, "a/".to_string());
        let mut seen = Vec::new();
        while let Some(ev) = stream.recv().await {
            seen.push((ev.key().to_string(), ev.decode::<u32>().unwrap()));
        }
        assert_eq!(
            seen,
            vec![
                ("k1".to_string(), 1),
                ("k2".to_string(), 2),
                ("k3".to_string(), 3)
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_event_has_no_value() {
        let (raw_tx, raw_rx) = unbounded_channel();
        raw_tx.send(RawWatchEvent::delete("k", Revision(5))).unwrap();
        drop(raw_tx);

        let mut stream = forward(raw_rx, MsgPackSerializer, String::new());
        let ev = stream.recv().await.unwrap();
        assert!(ev.is_delete());
        assert_eq!(ev.revision(), Revision(5));
        assert!(ev.decode::<u32>().unwrap_err().is_decode());
    }

    #[tokio::test]
    async fn test_bad_payload_does_not_end_stream() {
        let (raw_tx, raw_rx) = unbounded_channel();
        let s = MsgPackSerializer;
        raw_tx.send(RawWatchEvent::put("bad", vec![0xc1], Revision(1))).unwrap();
        raw_tx
            .send(RawWatchEvent::put("good", s.marshal(&9u32).unwrap(), Revision(2)))
            .unwrap();
        drop(raw_tx);

        let mut stream = forward(raw_rx, s, String::new());
        let first = stream.recv().await.unwrap();
        assert!(first.decode::<u32>().is_err());
        let second = stream.recv().await.unwrap();
        assert_eq!(second.decode::<u32>().unwrap(), 9);
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_stops_forwarding() {
        let (raw_tx, raw_rx) = unbounded_channel();
        let mut stream = forward(raw_rx, MsgPackSerializer, String::new());
        stream.cancel();
        tokio::task::yield_now().await;

        let _ = raw_tx.send(RawWatchEvent::delete("k", Revision(1)));
        assert!(stream.recv().await.is_none());
    }
}
