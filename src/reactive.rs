//! Observable state containers
//!
//! [`ReactiveMap`] is an observable string-keyed value map and
//! [`ReactiveCell`] an observable single value. Clones are cheap handles to
//! the same shared state, so a form and the UI layer bound to it observe one
//! container.
//!
//! Watchers run synchronously on the mutating thread, in registration order.
//! The watcher list is snapshotted before dispatch, so a callback may write
//! back into the container or manage subscriptions re-entrantly; watchers
//! registered during a notification first fire on the next mutation.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Handle returned by `subscribe`, used to remove the watcher again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(u64);

type MapWatcher = Arc<dyn Fn(&str, &Value) + Send + Sync>;

struct MapInner {
	values: RwLock<HashMap<String, Value>>,
	watchers: Mutex<Vec<(u64, MapWatcher)>>,
	next_watcher: AtomicU64,
}

/// An observable mapping from field key to value.
///
/// # Examples
///
/// ```
/// use reactive_forms::ReactiveMap;
/// use serde_json::json;
///
/// let map = ReactiveMap::new();
/// map.set("name", json!("Ada"));
/// assert_eq!(map.get("name"), Some(json!("Ada")));
/// ```
#[derive(Clone)]
pub struct ReactiveMap {
	inner: Arc<MapInner>,
}

impl ReactiveMap {
	pub fn new() -> Self {
		Self::from_values(HashMap::new())
	}

	/// Create a map seeded with `values`.
	pub fn from_values(values: HashMap<String, Value>) -> Self {
		Self {
			inner: Arc::new(MapInner {
				values: RwLock::new(values),
				watchers: Mutex::new(Vec::new()),
				next_watcher: AtomicU64::new(0),
			}),
		}
	}

	/// Current value for `key`, cloned.
	pub fn get(&self, key: &str) -> Option<Value> {
		self.read_values().get(key).cloned()
	}

	/// Insert or replace the value for `key`, notifying watchers.
	pub fn set(&self, key: &str, value: Value) {
		{
			let mut values = self.write_values();
			values.insert(key.to_string(), value.clone());
		}
		self.notify(key, &value);
	}

	/// Overwrite every key in `values`, notifying watchers once per key.
	///
	/// Keys not named in `values` are left untouched.
	pub fn assign(&self, values: HashMap<String, Value>) {
		{
			let mut current = self.write_values();
			for (key, value) in &values {
				current.insert(key.clone(), value.clone());
			}
		}
		for (key, value) in &values {
			self.notify(key, value);
		}
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.read_values().contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.read_values().len()
	}

	pub fn is_empty(&self) -> bool {
		self.read_values().is_empty()
	}

	/// A point-in-time copy of the whole map.
	pub fn snapshot(&self) -> HashMap<String, Value> {
		self.read_values().clone()
	}

	/// Register a watcher called with the key and new value on every
	/// mutation.
	pub fn subscribe(&self, watcher: impl Fn(&str, &Value) + Send + Sync + 'static) -> WatcherId {
		let id = self.inner.next_watcher.fetch_add(1, Ordering::Relaxed);
		self.lock_watchers().push((id, Arc::new(watcher)));
		WatcherId(id)
	}

	/// Remove a watcher. Returns whether it was registered.
	pub fn unsubscribe(&self, id: WatcherId) -> bool {
		let mut watchers = self.lock_watchers();
		let before = watchers.len();
		watchers.retain(|(watcher_id, _)| *watcher_id != id.0);
		watchers.len() != before
	}

	// Dispatch on a snapshot of the watcher list so callbacks can mutate
	// this container or its subscriptions without deadlocking.
	fn notify(&self, key: &str, value: &Value) {
		let watchers: Vec<MapWatcher> = self
			.lock_watchers()
			.iter()
			.map(|(_, watcher)| Arc::clone(watcher))
			.collect();
		for watcher in watchers {
			watcher(key, value);
		}
	}

	fn read_values(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Value>> {
		self.inner.values.read().unwrap_or_else(|e| e.into_inner())
	}

	fn write_values(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Value>> {
		self.inner.values.write().unwrap_or_else(|e| e.into_inner())
	}

	fn lock_watchers(&self) -> std::sync::MutexGuard<'_, Vec<(u64, MapWatcher)>> {
		self.inner.watchers.lock().unwrap_or_else(|e| e.into_inner())
	}
}

impl Default for ReactiveMap {
	fn default() -> Self {
		Self::new()
	}
}

type CellWatcher<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct CellInner<T> {
	value: RwLock<T>,
	watchers: Mutex<Vec<(u64, CellWatcher<T>)>>,
	next_watcher: AtomicU64,
}

/// An observable single value, replaced wholesale on `set`.
///
/// # Examples
///
/// ```
/// use reactive_forms::ReactiveCell;
///
/// let cell = ReactiveCell::new(0u32);
/// cell.set(7);
/// assert_eq!(cell.get(), 7);
/// ```
pub struct ReactiveCell<T> {
	inner: Arc<CellInner<T>>,
}

impl<T> Clone for ReactiveCell<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: Clone + Send + Sync> ReactiveCell<T> {
	pub fn new(value: T) -> Self {
		Self {
			inner: Arc::new(CellInner {
				value: RwLock::new(value),
				watchers: Mutex::new(Vec::new()),
				next_watcher: AtomicU64::new(0),
			}),
		}
	}

	/// Current value, cloned.
	pub fn get(&self) -> T {
		self.read_value().clone()
	}

	/// Borrow the current value without cloning.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.read_value())
	}

	/// Replace the value, notifying watchers with the new one.
	pub fn set(&self, value: T) {
		let snapshot = value.clone();
		{
			let mut current = self.write_value();
			*current = value;
		}
		self.notify(&snapshot);
	}

	/// Register a watcher called with the new value after every `set`.
	pub fn subscribe(&self, watcher: impl Fn(&T) + Send + Sync + 'static) -> WatcherId {
		let id = self.inner.next_watcher.fetch_add(1, Ordering::Relaxed);
		self.lock_watchers().push((id, Arc::new(watcher)));
		WatcherId(id)
	}

	/// Remove a watcher. Returns whether it was registered.
	pub fn unsubscribe(&self, id: WatcherId) -> bool {
		let mut watchers = self.lock_watchers();
		let before = watchers.len();
		watchers.retain(|(watcher_id, _)| *watcher_id != id.0);
		watchers.len() != before
	}

	// Same snapshot discipline as ReactiveMap::notify.
	fn notify(&self, value: &T) {
		let watchers: Vec<CellWatcher<T>> = self
			.lock_watchers()
			.iter()
			.map(|(_, watcher)| Arc::clone(watcher))
			.collect();
		for watcher in watchers {
			watcher(value);
		}
	}

	fn read_value(&self) -> std::sync::RwLockReadGuard<'_, T> {
		self.inner.value.read().unwrap_or_else(|e| e.into_inner())
	}

	fn write_value(&self) -> std::sync::RwLockWriteGuard<'_, T> {
		self.inner.value.write().unwrap_or_else(|e| e.into_inner())
	}

	fn lock_watchers(&self) -> std::sync::MutexGuard<'_, Vec<(u64, CellWatcher<T>)>> {
		self.inner.watchers.lock().unwrap_or_else(|e| e.into_inner())
	}
}

impl<T: Clone + Send + Sync + Default> Default for ReactiveCell<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::sync::atomic::AtomicUsize;

	#[test]
	fn test_map_set_get_snapshot() {
		let map = ReactiveMap::new();
		map.set("name", json!("Ada"));
		map.set("age", json!(36));

		assert_eq!(map.get("name"), Some(json!("Ada")));
		assert_eq!(map.len(), 2);

		let snapshot = map.snapshot();
		assert_eq!(snapshot.get("age"), Some(&json!(36)));

		// Snapshot is a copy, later mutation does not affect it
		map.set("age", json!(37));
		assert_eq!(snapshot.get("age"), Some(&json!(36)));
	}

	#[test]
	fn test_map_clone_shares_state() {
		let map = ReactiveMap::new();
		let handle = map.clone();
		handle.set("key", json!(1));
		assert_eq!(map.get("key"), Some(json!(1)));
	}

	#[test]
	fn test_map_watchers_fire_per_mutation() {
		let map = ReactiveMap::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = Arc::clone(&calls);
		map.subscribe(move |_, _| {
			seen.fetch_add(1, Ordering::SeqCst);
		});

		map.set("a", json!(1));
		let mut bulk = HashMap::new();
		bulk.insert("a".to_string(), json!(2));
		bulk.insert("b".to_string(), json!(3));
		map.assign(bulk);

		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn test_map_watcher_may_set_reentrantly() {
		let map = ReactiveMap::new();
		let handle = map.clone();
		map.subscribe(move |key, value| {
			// Mirror mutations of "a" into "echo", as a UI binding would
			if key == "a" {
				handle.set("echo", value.clone());
			}
		});

		map.set("a", json!(7));

		assert_eq!(map.get("echo"), Some(json!(7)));
	}

	#[test]
	fn test_map_watcher_may_unsubscribe_itself() {
		let map = ReactiveMap::new();
		let calls = Arc::new(AtomicUsize::new(0));

		let handle = map.clone();
		let seen = Arc::clone(&calls);
		let slot: Arc<Mutex<Option<WatcherId>>> = Arc::new(Mutex::new(None));
		let own_id = Arc::clone(&slot);
		let id = map.subscribe(move |_, _| {
			seen.fetch_add(1, Ordering::SeqCst);
			if let Some(id) = own_id.lock().unwrap().take() {
				handle.unsubscribe(id);
			}
		});
		*slot.lock().unwrap() = Some(id);

		map.set("a", json!(1));
		map.set("a", json!(2));

		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_map_unsubscribe() {
		let map = ReactiveMap::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = Arc::clone(&calls);
		let id = map.subscribe(move |_, _| {
			seen.fetch_add(1, Ordering::SeqCst);
		});

		map.set("a", json!(1));
		assert!(map.unsubscribe(id));
		assert!(!map.unsubscribe(id));
		map.set("a", json!(2));

		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_cell_set_get_and_watch() {
		let cell = ReactiveCell::new(String::from("initial"));
		let observed = Arc::new(Mutex::new(Vec::new()));
		let sink = Arc::clone(&observed);
		cell.subscribe(move |value: &String| {
			sink.lock().unwrap().push(value.clone());
		});

		cell.set("next".to_string());
		assert_eq!(cell.get(), "next");
		assert_eq!(observed.lock().unwrap().as_slice(), ["next".to_string()]);
	}

	#[test]
	fn test_cell_watcher_may_set_reentrantly() {
		let cell = ReactiveCell::new(0u32);
		let handle = cell.clone();
		cell.subscribe(move |value: &u32| {
			if *value == 1 {
				handle.set(2);
			}
		});

		cell.set(1);

		assert_eq!(cell.get(), 2);
	}

	#[test]
	fn test_cell_with_borrows_without_clone() {
		let cell = ReactiveCell::new(vec![1, 2, 3]);
		let len = cell.with(|v| v.len());
		assert_eq!(len, 3);
	}
}
