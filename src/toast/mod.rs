use crate::models::toast::{ ToastItem, ToastOptions, DEFAULT_TIMEOUT_MS };
use log::debug;
use std::collections::{ HashMap, VecDeque };
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError, Weak };
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use uuid::Uuid;

type Observer = Arc<dyn Fn(&[ToastItem]) + Send + Sync>;

/// A snapshot waiting to be handed to the observers registered when it was taken.
struct Delivery {
    items: Vec<ToastItem>,
    observers: Vec<Observer>,
}

#[derive(Default)]
struct Inner {
    items: Vec<ToastItem>,
    timers: HashMap<String, JoinHandle<()>>,
    observers: HashMap<u64, Observer>,
    next_observer_id: u64,
    outbox: VecDeque<Delivery>,
    delivering: bool,
}

impl Inner {
    fn enqueue(&mut self) {
        let delivery = Delivery {
            items: self.items.clone(),
            observers: self.observers.values().cloned().collect(),
        };
        self.outbox.push_back(delivery);
    }

    fn take_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

/// Observable queue of transient notifications, newest first.
///
/// Each pushed toast removes itself once its timeout elapses unless it is removed
/// explicitly before that. Clones share the same queue.
///
/// Observers see snapshots in the order the mutations happened, even when the
/// store is shared across threads.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<Mutex<Inner>>,
    runtime: Handle,
}

impl ToastStore {
    /// Creates a store whose expiry timers run on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; use [`ToastStore::with_runtime`] there.
    pub fn new() -> Self {
        Self::with_runtime(Handle::current())
    }

    /// Creates a store whose expiry timers run on `runtime`. The store itself may
    /// then be used from any thread.
    pub fn with_runtime(runtime: Handle) -> Self {
        Self { inner: Arc::default(), runtime }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    pub fn items(&self) -> Vec<ToastItem> {
        self.lock().items.clone()
    }

    /// Adds a toast to the front of the queue and schedules its expiry.
    ///
    /// A `timeout_ms` of zero expires the toast as soon as the runtime gets to it.
    pub fn push(&self, message: impl Into<String>, options: ToastOptions) -> String {
        let timeout_ms = options.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        let item = ToastItem {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            variant: options.variant.unwrap_or_default(),
            timeout_ms,
        };
        let id = item.id.clone();

        {
            let mut inner = self.lock();
            inner.items.insert(0, item);
            // Spawned under the lock so the timer cannot observe the queue before the insert.
            let timer = spawn_expiry(&self.runtime, Arc::downgrade(&self.inner), id.clone(), timeout_ms);
            inner.timers.insert(id.clone(), timer);
            inner.enqueue();
        }
        debug!("Toast {} pushed, expires in {}ms", id, timeout_ms);

        deliver(&self.inner);
        id
    }

    /// Removes the toast with `id` and cancels its timer. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        let changed = {
            let mut inner = self.lock();
            if let Some(timer) = inner.timers.remove(id) {
                timer.abort();
            }
            let changed = inner.take_item(id);
            if changed {
                inner.enqueue();
            }
            changed
        };

        if changed {
            debug!("Toast {} removed", id);
            deliver(&self.inner);
        }
    }

    /// Registers `observer`, calling it right away with the current queue and then
    /// after every push or removal.
    ///
    /// Observers run without the store lock held, so they may call back into the
    /// store. Mutations made from inside an observer are delivered after it returns.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
        where F: Fn(&[ToastItem]) + Send + Sync + 'static
    {
        let observer: Observer = Arc::new(observer);
        let id = {
            let mut inner = self.lock();
            let id = inner.next_observer_id;
            inner.next_observer_id += 1;
            inner.observers.insert(id, observer.clone());
            let delivery = Delivery { items: inner.items.clone(), observers: vec![observer] };
            inner.outbox.push_back(delivery);
            id
        };

        deliver(&self.inner);
        Subscription { store: Arc::downgrade(&self.inner), id }
    }
}

/// Handle returned by [`ToastStore::subscribe`].
pub struct Subscription {
    store: Weak<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.store.upgrade() {
            lock_inner(&inner).observers.remove(&self.id);
        }
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drains the outbox in order. Only one caller drains at a time; anyone arriving
/// while a drain is running leaves their delivery for that drainer to pick up.
fn deliver(inner: &Mutex<Inner>) {
    {
        let mut guard = lock_inner(inner);
        if guard.delivering {
            return;
        }
        guard.delivering = true;
    }

    loop {
        let next = {
            let mut guard = lock_inner(inner);
            match guard.outbox.pop_front() {
                Some(delivery) => delivery,
                None => {
                    guard.delivering = false;
                    return;
                }
            }
        };

        for observer in &next.observers {
            observer(&next.items);
        }
    }
}

fn spawn_expiry(runtime: &Handle, store: Weak<Mutex<Inner>>, id: String, timeout_ms: u64) -> JoinHandle<()> {
    runtime.spawn(async move {
        tokio::time::sleep(Duration::from_millis(timeout_ms)).await;

        let Some(inner) = store.upgrade() else {
            return;
        };
        let changed = {
            let mut guard = lock_inner(&inner);
            guard.timers.remove(&id);
            let changed = guard.take_item(&id);
            if changed {
                guard.enqueue();
            }
            changed
        };

        if changed {
            debug!("Toast {} expired", id);
            deliver(&inner);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::toast::ToastVariant;
    use std::collections::HashSet;
    use tokio::time::sleep;

    type Log = Arc<Mutex<Vec<Vec<ToastItem>>>>;

    fn record(store: &ToastStore) -> (Log, Subscription) {
        let log: Log = Arc::default();
        let sink = log.clone();
        let sub = store.subscribe(move |items| sink.lock().unwrap().push(items.to_vec()));
        (log, sub)
    }

    #[tokio::test(start_paused = true)]
    async fn push_returns_unique_ids_newest_first() {
        let store = ToastStore::new();
        let (log, _sub) = record(&store);

        let mut ids = HashSet::new();
        for i in 0..20 {
            let id = store.push(format!("toast {}", i), ToastOptions::default());
            assert!(ids.insert(id.clone()), "id {} was reused", id);

            let latest = log.lock().unwrap().last().cloned().unwrap();
            assert_eq!(latest[0].id, id);
            assert_eq!(latest.len(), i + 1);
        }

        let items = store.items();
        assert_eq!(items.first().unwrap().message, "toast 19");
        assert_eq!(items.last().unwrap().message, "toast 0");
    }

    #[tokio::test(start_paused = true)]
    async fn defaults_and_overrides() {
        let store = ToastStore::new();
        store.push("plain", ToastOptions::default());
        store.push("custom", ToastOptions::default().variant(ToastVariant::Error).timeout_ms(250));

        let items = store.items();
        assert_eq!(items[1].variant, ToastVariant::Info);
        assert_eq!(items[1].timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(items[0].variant, ToastVariant::Error);
        assert_eq!(items[0].timeout_ms, 250);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_expires_on_next_tick() {
        let store = ToastStore::new();
        let (log, _sub) = record(&store);
        store.push("flash", ToastOptions::default().timeout_ms(0));
        assert_eq!(store.items()[0].timeout_ms, 0);

        sleep(Duration::from_millis(1)).await;
        assert!(store.items().is_empty());
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn remove_is_idempotent() {
        let store = ToastStore::new();
        let keep = store.push("keep", ToastOptions::default());
        let drop_me = store.push("drop", ToastOptions::default());
        let (log, _sub) = record(&store);

        store.remove(&drop_me);
        store.remove(&drop_me);
        store.remove("never-existed");

        // initial snapshot + one removal
        assert_eq!(log.lock().unwrap().len(), 2);
        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, keep);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_timeout() {
        let store = ToastStore::new();
        let (log, _sub) = record(&store);
        let id = store.push("bye", ToastOptions::default().timeout_ms(100));

        sleep(Duration::from_millis(99)).await;
        assert_eq!(store.items().len(), 1);

        sleep(Duration::from_millis(2)).await;
        assert!(store.items().is_empty());
        assert!(store.lock().timers.is_empty());

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 3);
        assert!(log[2].iter().all(|t| t.id != id));
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_remove_cancels_timer() {
        let store = ToastStore::new();
        let id = store.push("short", ToastOptions::default().timeout_ms(50));
        let other = store.push("long", ToastOptions::default().timeout_ms(500));
        store.remove(&id);
        assert_eq!(store.lock().timers.len(), 1);

        let (log, _sub) = record(&store);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(store.items()[0].id, other);
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribe_stops_updates() {
        let store = ToastStore::new();
        let (first, sub_a) = record(&store);
        let (second, _sub_b) = record(&store);

        store.push("one", ToastOptions::default());
        sub_a.unsubscribe();
        sub_a.unsubscribe();
        store.push("two", ToastOptions::default());

        assert_eq!(first.lock().unwrap().len(), 2);
        assert_eq!(second.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn observer_may_reenter_store() {
        let store = ToastStore::new();
        let seen = Arc::new(Mutex::new(0usize));
        let (handle, counter) = (store.clone(), seen.clone());
        let _sub = store.subscribe(move |items| {
            assert_eq!(handle.items().len(), items.len());
            *counter.lock().unwrap() += 1;
        });

        let id = store.push("hi", ToastOptions::default());
        store.remove(&id);
        assert_eq!(*seen.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_outliving_store_is_noop() {
        let store = ToastStore::new();
        store.push("orphan", ToastOptions::default().timeout_ms(10));
        drop(store);
        sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn snapshots_arrive_in_mutation_order_across_threads() {
        use std::sync::mpsc;

        let store = ToastStore::new();
        let (entered_tx, entered_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (entered_tx, release_rx) = (Mutex::new(entered_tx), Mutex::new(release_rx));

        let log: Log = Arc::default();
        let sink = log.clone();
        let _sub = store.subscribe(move |items| {
            sink.lock().unwrap().push(items.to_vec());
            // Hold the pushing thread inside its notification.
            if items.len() == 1 {
                entered_tx.lock().unwrap().send(()).unwrap();
                release_rx.lock().unwrap().recv().unwrap();
            }
        });

        let pusher = store.clone();
        let worker = std::thread::spawn(move || pusher.push("x", ToastOptions::default()));
        entered_rx.recv().unwrap();

        let id = store.items()[0].id.clone();
        store.remove(&id);
        release_tx.send(()).unwrap();
        assert_eq!(worker.join().unwrap(), id);

        assert!(store.items().is_empty());
        let log = log.lock().unwrap();
        let lens: Vec<usize> = log.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![0, 1, 0]);
    }

    #[test]
    fn push_from_outside_the_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let store = ToastStore::with_runtime(runtime.handle().clone());

        store.push("from a plain thread", ToastOptions::default().timeout_ms(10));
        assert_eq!(store.items().len(), 1);

        runtime.block_on(async { sleep(Duration::from_millis(50)).await });
        assert!(store.items().is_empty());
    }

    #[test]
    fn item_serializes_for_ui() {
        let item = ToastItem {
            id: "abc".into(),
            message: "Saved".into(),
            variant: ToastVariant::Success,
            timeout_ms: 4000,
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            serde_json::json!({ "id": "abc", "message": "Saved", "variant": "success", "timeoutMs": 4000 })
        );
    }
}
