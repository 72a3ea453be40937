//! Temporal bracketing of result streams with loading markers.
//!
//! Fetch handlers wrap the stream of results from the fetch interface so
//! that consumers observe a synthetic start marker before any result and a
//! terminal end marker once the producer completes, successfully or not.
//! Consumers map the markers onto whichever context flag they bracket.

use futures::future;
use futures::{Stream, StreamExt, stream};

/// Element of a loading-bracketed stream.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadingMark<T> {
    /// Yielded before the underlying producer is polled at all.
    Begin,
    /// A value forwarded from the underlying producer.
    Item(T),
    /// The terminal element, once the producer has completed.
    End,
}

/// Bracket a stream with [`LoadingMark::Begin`] and [`LoadingMark::End`].
///
/// Ordering guarantee: `Begin` is always observed strictly before any
/// forwarded item, and `End` is always the last element. Restarting means
/// wrapping a fresh stream; the bracket replays in full.
pub fn with_loading_emission<S>(inner: S) -> impl Stream<Item = LoadingMark<S::Item>>
where
    S: Stream,
{
    stream::once(future::ready(LoadingMark::Begin))
        .chain(inner.map(LoadingMark::Item))
        .chain(stream::once(future::ready(LoadingMark::End)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn brackets_a_single_item_stream() {
        let marks: Vec<_> = with_loading_emission(stream::iter([42])).collect().await;

        assert_eq!(
            marks,
            vec![LoadingMark::Begin, LoadingMark::Item(42), LoadingMark::End]
        );
    }

    #[tokio::test]
    async fn brackets_an_empty_stream() {
        let marks: Vec<_> = with_loading_emission(stream::iter(Vec::<u32>::new()))
            .collect()
            .await;

        assert_eq!(marks, vec![LoadingMark::Begin, LoadingMark::End]);
    }

    #[tokio::test]
    async fn forwards_every_item_in_order() {
        let marks: Vec<_> = with_loading_emission(stream::iter(["a", "b", "c"]))
            .collect()
            .await;

        assert_eq!(
            marks,
            vec![
                LoadingMark::Begin,
                LoadingMark::Item("a"),
                LoadingMark::Item("b"),
                LoadingMark::Item("c"),
                LoadingMark::End,
            ]
        );
    }

    #[tokio::test]
    async fn begin_is_available_before_the_producer_is_polled() {
        // A pending producer must not delay the start marker.
        let mut marks = Box::pin(with_loading_emission(stream::pending::<u32>()));

        let first = futures::FutureExt::now_or_never(marks.next());
        assert_eq!(first, Some(Some(LoadingMark::Begin)));
    }
}
