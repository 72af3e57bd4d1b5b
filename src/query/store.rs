//! Shared record of the list-query parameters.

use super::{GroupListQuery, ListSort, ListStatus};
use log::*;
use std::cell::RefCell;
use std::rc::Rc;

pub type SubscriptionId = usize;

type ChangeListener = Rc<dyn Fn(&GroupListQuery)>;

struct Inner {
    query: GroupListQuery,
    revision: u64,
    next_id: SubscriptionId,
    listeners: Vec<(SubscriptionId, ChangeListener)>,
}

/// Page-lifetime store of the current `GroupListQuery`.
///
/// Cloning the store clones the handle, not the record. Change listeners are
/// called after the store has been updated and released, so a listener may
/// read the store again.
///
#[derive(Clone)]
pub struct QueryStateStore {
    inner: Rc<RefCell<Inner>>,
}

impl Default for QueryStateStore {
    fn default() -> Self {
        QueryStateStore::new(GroupListQuery::default())
    }
}

impl QueryStateStore {
    /// Return a new store seeded with the given query.
    ///
    pub fn new(initial: GroupListQuery) -> Self {
        QueryStateStore {
            inner: Rc::new(RefCell::new(Inner {
                query: initial,
                revision: 0,
                next_id: 0,
                listeners: vec![],
            })),
        }
    }

    /// Returns a snapshot of the current query.
    ///
    pub fn get(&self) -> GroupListQuery {
        self.inner.borrow().query.clone()
    }

    /// Returns how many changes the store has accepted.
    ///
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    /// Replace the current query. Returns false (and notifies nobody) when
    /// the new query equals the current one.
    ///
    pub fn set(&self, query: GroupListQuery) -> bool {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            if inner.query == query {
                return false;
            }
            inner.query = query;
            inner.revision += 1;
            trace!("Query store advanced to revision {}.", inner.revision);
            inner
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect::<Vec<_>>()
        };
        let snapshot = self.get();
        for listener in listeners {
            listener(&snapshot);
        }
        true
    }

    /// Apply a mutation to a copy of the current query and store the result.
    ///
    pub fn update<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut GroupListQuery),
    {
        let mut query = self.get();
        mutate(&mut query);
        self.set(query)
    }

    /// Search by title, returning to the first page.
    ///
    pub fn apply_search_term(&self, term: &str) -> bool {
        self.update(|query| {
            query.title = term.to_owned();
            query.page = "1".to_string();
        })
    }

    /// Filter by recruitment status, returning to the first page.
    ///
    pub fn apply_status(&self, status: ListStatus) -> bool {
        self.update(|query| {
            query.status = status;
            query.page = "1".to_string();
        })
    }

    /// Filter by area, returning to the first page.
    ///
    pub fn apply_area(&self, area: &str) -> bool {
        self.update(|query| {
            query.area = area.to_owned();
            query.page = "1".to_string();
        })
    }

    /// Change the ordering, returning to the first page.
    ///
    pub fn apply_sort(&self, sort: ListSort) -> bool {
        self.update(|query| {
            query.sort = sort;
            query.page = "1".to_string();
        })
    }

    pub fn apply_page(&self, page: &str) -> bool {
        self.update(|query| query.page = page.to_owned())
    }

    /// Register a listener called with the new query after every change.
    ///
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&GroupListQuery) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    ///
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}
