use std::{
	pin::Pin,
	task::{Context, Poll},
};

use futures_channel::mpsc;
use futures_lite::{Stream, StreamExt};

use crate::{ActionDisposable, Event, Payload, ScopedDisposable, SignalProducer};

/// The events of one [`SignalProducer`] start, as a [`Stream`].
///
/// Ends after the terminal event. Dropping it disposes the start.
#[must_use = "Streams do nothing unless polled, and dropping one interrupts its producer."]
#[derive(Debug)]
pub struct EventStream<T, E> {
	receiver: mpsc::UnboundedReceiver<Event<T, E>>,
	done: bool,
	_subscription: ScopedDisposable<ActionDisposable>,
}

impl<T, E> Stream for EventStream<T, E> {
	type Item = Event<T, E>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		let this = self.get_mut();
		if this.done {
			return Poll::Ready(None);
		}
		let next = Pin::new(&mut this.receiver).poll_next(cx);
		if let Poll::Ready(next) = &next {
			this.done = next.as_ref().is_none_or(Event::is_terminal);
		}
		next
	}
}

impl<T: Payload, E: Payload> SignalProducer<T, E> {
	/// Starts the producer and buffers its events into an [`EventStream`].
	pub fn into_stream(&self) -> EventStream<T, E> {
		let (sender, receiver) = mpsc::unbounded();
		let subscription = self.start_with(move |event| {
			// The receiver may be gone already, in which case the start is being disposed.
			let _ = sender.unbounded_send(event);
		});
		EventStream {
			receiver,
			done: false,
			_subscription: ScopedDisposable::new(subscription),
		}
	}

	/// Starts the producer and waits for its first value or its failure.
	///
	/// **Returns** [`None`] iff the producer completed or was interrupted before sending a value.
	/// The start is disposed afterwards either way.
	pub async fn first(&self) -> Option<Result<T, E>> {
		let mut stream = self.into_stream();
		match stream.next().await? {
			Event::Value(value) => Some(Ok(value)),
			Event::Failed(error) => Some(Err(error)),
			Event::Completed | Event::Interrupted => None,
		}
	}
}
