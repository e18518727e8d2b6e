use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll, ready},
};

use bytes::Bytes;
use futures_core::Stream;
use pin_project_lite::pin_project;

pin_project! {
    /// Pulls chunks out of a byte [`Stream`] and hands them to a sink one at a time, in order.
    ///
    /// Errors from the source are returned as-is, end of stream completes the consumer.
    #[derive(Debug)]
    pub struct ByteStreamConsumer<S> {
        #[pin]
        source: S,
        finished: bool,
    }
}

impl<S> ByteStreamConsumer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            finished: false,
        }
    }

    /// Whether the source has reported end of stream
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drives the consumer to completion as a future, feeding every chunk to `sink`
    pub fn consume<F>(self, sink: F) -> Consume<S, F> {
        Consume {
            consumer: self,
            sink,
        }
    }
}

impl<S, B, E> ByteStreamConsumer<S>
where
    S: Stream<Item = Result<B, E>>,
    B: Into<Bytes>,
{
    /// Polls for the next chunk. `Ready(None)` once the source is exhausted.
    pub fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, E>>> {
        let this = self.project();
        if *this.finished {
            return Poll::Ready(None);
        }

        match ready!(this.source.poll_next(cx)) {
            Some(Ok(chunk)) => Poll::Ready(Some(Ok(chunk.into()))),
            Some(Err(e)) => Poll::Ready(Some(Err(e))),
            None => {
                *this.finished = true;
                Poll::Ready(None)
            }
        }
    }

    /// Feeds every chunk that is already available to `sink`, returning `Pending` once the
    /// source has to wait and `Ready` on end of stream or error.
    pub fn poll_consume<F>(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        mut sink: F,
    ) -> Poll<Result<(), E>>
    where
        F: FnMut(Bytes),
    {
        loop {
            match ready!(self.as_mut().poll_next_chunk(cx)) {
                Some(Ok(chunk)) => sink(chunk),
                Some(Err(e)) => return Poll::Ready(Err(e)),
                None => return Poll::Ready(Ok(())),
            }
        }
    }
}

pin_project! {
    /// Future returned by [`ByteStreamConsumer::consume`]
    #[derive(Debug)]
    #[must_use = "futures do nothing unless polled"]
    pub struct Consume<S, F> {
        #[pin]
        consumer: ByteStreamConsumer<S>,
        sink: F,
    }
}

impl<S, B, E, F> Future for Consume<S, F>
where
    S: Stream<Item = Result<B, E>>,
    B: Into<Bytes>,
    F: FnMut(Bytes),
{
    type Output = Result<(), E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        this.consumer.poll_consume(cx, this.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[tokio::test]
    async fn chunks_arrive_in_order() {
        let mut seen = Vec::new();
        let source = futures::stream::iter(vec![
            Ok::<_, ()>(Bytes::from_static(b"a")),
            Ok(Bytes::new()),
            Ok(Bytes::from_static(b"bc")),
        ]);

        ByteStreamConsumer::new(source)
            .consume(|chunk| seen.push(chunk))
            .await
            .unwrap();

        assert_eq!(
            seen,
            vec![
                Bytes::from_static(b"a"),
                Bytes::new(),
                Bytes::from_static(b"bc")
            ]
        );
    }

    #[tokio::test]
    async fn source_errors_stop_consumption() {
        let mut seen = Vec::new();
        let source = futures::stream::iter(vec![
            Ok(alloc::vec![b'x']),
            Err("boom"),
            Ok(alloc::vec![b'y']),
        ]);

        let result = ByteStreamConsumer::new(source)
            .consume(|chunk| seen.push(chunk))
            .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(seen, vec![Bytes::from_static(b"x")]);
    }
}
