use alloc::collections::VecDeque;
use core::{
    pin::Pin,
    task::{Context, Poll, ready},
};

use bytes::Bytes;
use bytes_utils::Str;
use futures_core::Stream;

use crate::{
    assembler::{Dispatch, Pipeline},
    constants::EMPTY_STR,
    consumer::ByteStreamConsumer,
    message::Message,
};

pin_project_lite::pin_project! {
    /// [`Stream`] of [`Message`]s parsed from a single byte stream, without any reconnection.
    ///
    /// Use this when a dropped stream can't be resumed anyway, otherwise see
    /// [`Subscription`][crate::subscription::Subscription].
    #[derive(Debug)]
    pub struct MessageStream<S> {
        #[pin]
        consumer: ByteStreamConsumer<S>,
        pipeline: Pipeline,
        ready: VecDeque<Message>,
        last_event_id: Str,
        retry: Option<i64>,
    }
}

impl<S> MessageStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            consumer: ByteStreamConsumer::new(stream),
            pipeline: Pipeline::new(),
            ready: VecDeque::new(),
            last_event_id: EMPTY_STR,
            retry: None,
        }
    }

    /// Sticky id, the last `id` field seen so far (empty if none or if it was cleared)
    pub fn last_event_id(&self) -> &Str {
        &self.last_event_id
    }

    /// Last successfully parsed `retry` field, in milliseconds
    pub fn retry(&self) -> Option<i64> {
        self.retry
    }
}

impl<S, B, E> Stream for MessageStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: Into<Bytes>,
{
    type Item = Result<Message, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(message) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(message)));
            }

            let chunk = match ready!(this.consumer.as_mut().poll_next_chunk(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                // a trailing unterminated block is never delivered
                None => return Poll::Ready(None),
            };

            let ready = &mut *this.ready;
            let last_event_id = &mut *this.last_event_id;
            let retry = &mut *this.retry;
            this.pipeline.feed(chunk, |dispatch| match dispatch {
                Dispatch::Id(id) => *last_event_id = id,
                Dispatch::Retry(ms) => *retry = Some(ms),
                Dispatch::Message(message) => ready.push_back(message),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::prelude::*;

    #[tokio::test]
    async fn messages_and_sticky_state() {
        let mut stream = MessageStream::new(futures::stream::iter(vec![
            Ok::<_, ()>(Bytes::from_static(b"id: 1\ndata: A\n\n")),
            Ok(Bytes::from_static(b"retry: 250\nid: 2\ndata: B\n\n")),
        ]));

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(&*first.id, "1");
        assert_eq!(&*first.data, "A");

        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(&*second.id, "2");
        assert_eq!(&*second.data, "B");
        assert_eq!(second.retry, Some(250));

        assert!(stream.next().await.is_none());
        assert_eq!(&**stream.last_event_id(), "2");
        assert_eq!(stream.retry(), Some(250));
    }

    #[tokio::test]
    async fn unterminated_block_is_dropped() {
        let messages = MessageStream::new(futures::stream::iter(vec![Ok::<_, ()>(
            Bytes::from_static(b"data: done\n\ndata: half"),
        )]))
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(&*messages[0].data, "done");
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let mut stream = MessageStream::new(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"data: x\n\n")),
            Err("reset"),
        ]));

        assert_eq!(&*stream.next().await.unwrap().unwrap().data, "x");
        assert_eq!(stream.next().await.unwrap(), Err("reset"));
        assert!(stream.next().await.is_none());
    }
}
