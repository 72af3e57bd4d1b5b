//! Two-way synchronization between the `QueryStateStore` and the address bar.
//!
//! Three triggers are handled:
//! - mount: URL values overwrite the store (keys missing from the URL keep
//!   their in-memory value), then the full store is written to the URL
//! - store change: the full store replaces the URL query string
//! - back/forward navigation: as on mount, but only when the URL differs
//!
//! The synchronizer remembers the last query it copied from the URL into the
//! store. When the store change it caused comes back around, the URL entry is
//! replaced in place instead of pushing a new history entry, and nothing is
//! written at all when the URL already matches. This keeps the two sides from
//! chasing each other.

use super::{GroupListQuery, History, ListenerId, QueryStateStore, SubscriptionId};
use log::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct SyncState {
    last_applied: Option<GroupListQuery>,
    url_writes: u64,
}

/// Mediates between the list-query store and the address bar.
///
pub struct QuerySynchronizer {
    store: QueryStateStore,
    history: History,
    state: Rc<RefCell<SyncState>>,
}

/// Live mount of a `QuerySynchronizer`.
///
/// Holds the navigation listener and the store subscription; both are
/// released when the guard is dropped. The guard borrows the synchronizer
/// mutably, so at most one mount is active at a time.
///
pub struct SyncGuard<'a> {
    sync: &'a mut QuerySynchronizer,
    listener: ListenerId,
    subscription: SubscriptionId,
}

impl QuerySynchronizer {
    /// Return a new synchronizer for the injected store and address bar.
    ///
    pub fn new(store: QueryStateStore, history: History) -> Self {
        QuerySynchronizer {
            store,
            history,
            state: Rc::new(RefCell::new(SyncState::default())),
        }
    }

    pub fn store(&self) -> &QueryStateStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns how many times the synchronizer has written the URL.
    ///
    pub fn url_writes(&self) -> u64 {
        self.state.borrow().url_writes
    }

    /// Reconcile the store with the current URL, start listening for store
    /// changes and navigation, and write the settled store to the URL.
    ///
    pub fn mount(&mut self) -> SyncGuard<'_> {
        debug!("Mounting query synchronizer at '{}'...", self.history.location());

        let params = self.history.search_params();
        let current = self.store.get();
        if current.differs_from(&params) {
            debug!("Adopting URL query parameters on mount.");
            self.store.set(current.merged_with(&params));
        }

        let subscription = {
            let history = self.history.clone();
            let state = Rc::clone(&self.state);
            self.store.subscribe(move |query| {
                let from_url = match state.borrow_mut().last_applied.take() {
                    Some(applied) => applied == *query,
                    None => false,
                };
                let mode = if from_url {
                    WriteMode::Replace
                } else {
                    WriteMode::Push
                };
                write_url(&history, &state, query, mode);
            })
        };

        let listener = {
            let store = self.store.clone();
            let history = self.history.clone();
            let state = Rc::clone(&self.state);
            self.history.subscribe(move |event| {
                let params = event.search_params();
                let current = store.get();
                if current.differs_from(&params) {
                    let merged = current.merged_with(&params);
                    debug!("Adopting URL query parameters after navigation: {:?}", merged);
                    state.borrow_mut().last_applied = Some(merged.clone());
                    store.set(merged);
                } else {
                    // The store already agrees; make sure the URL is complete.
                    write_url(&history, &state, &current, WriteMode::Replace);
                }
            })
        };

        write_url(
            &self.history,
            &self.state,
            &self.store.get(),
            WriteMode::Replace,
        );

        SyncGuard {
            sync: self,
            listener,
            subscription,
        }
    }
}

impl<'a> SyncGuard<'a> {
    pub fn store(&self) -> &QueryStateStore {
        &self.sync.store
    }

    pub fn history(&self) -> &History {
        &self.sync.history
    }

    /// Tear the mount down explicitly. Equivalent to dropping the guard.
    ///
    pub fn unmount(self) {}
}

impl<'a> Drop for SyncGuard<'a> {
    fn drop(&mut self) {
        self.sync.history.unsubscribe(self.listener);
        self.sync.store.unsubscribe(self.subscription);
        self.sync.state.borrow_mut().last_applied = None;
        debug!("Unmounted query synchronizer.");
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum WriteMode {
    Push,
    Replace,
}

/// Write the full query to the URL unless it already carries exactly that
/// query. User-originated changes push a history entry; everything the
/// synchronizer copies from the URL itself replaces the current entry.
///
fn write_url(
    history: &History,
    state: &Rc<RefCell<SyncState>>,
    query: &GroupListQuery,
    mode: WriteMode,
) {
    if history.search_params().matches_exactly(query) {
        trace!("URL already matches query store, skipping write.");
        return;
    }

    let mut url = history.location();
    url.query_pairs_mut().clear().extend_pairs(query.pairs());
    match mode {
        WriteMode::Push => history.push(url),
        WriteMode::Replace => history.replace(url),
    }
    state.borrow_mut().url_writes += 1;
    debug!("Wrote query store to URL '{}' ({:?}).", history.location(), mode);
}
