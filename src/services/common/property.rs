use futures::stream::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A value that tasks can observe
///
/// Writers are crate-internal; readers take snapshots with [`get`](Self::get)
/// or follow changes through [`watch`](Self::watch). Setting an equal value
/// does not wake watchers.
#[derive(Clone)]
pub struct Property<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// Creates a property holding `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Stores `value`; returns whether it differed from the previous one.
    pub(crate) fn set(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        self.tx.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Current value followed by every change.
    pub fn watch(&self) -> impl Stream<Item = T> + Send + use<T> {
        WatchStream::new(self.tx.subscribe())
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Property").field(&*self.tx.borrow()).finish()
    }
}
