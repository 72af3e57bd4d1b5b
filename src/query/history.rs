//! Address bar and back/forward history.
//!
//! `push` and `replace` change the current entry silently. `back` and
//! `forward` move between entries and notify every navigation listener,
//! mirroring the browser's `popstate` behaviour.

use super::SearchParams;
use log::*;
use reqwest::Url;
use std::cell::RefCell;
use std::rc::Rc;

pub type ListenerId = usize;

/// Describes a completed back/forward navigation.
///
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationEvent {
    pub url: Url,
}

impl NavigationEvent {
    pub fn search_params(&self) -> SearchParams {
        SearchParams::from_url(&self.url)
    }
}

type NavigationListener = Rc<dyn Fn(&NavigationEvent)>;

struct Inner {
    entries: Vec<Url>,
    index: usize,
    next_id: ListenerId,
    listeners: Vec<(ListenerId, NavigationListener)>,
}

/// Shared handle to the address bar.
///
#[derive(Clone)]
pub struct History {
    inner: Rc<RefCell<Inner>>,
}

impl History {
    /// Return a new history whose only entry is `initial`.
    ///
    pub fn new(initial: Url) -> Self {
        History {
            inner: Rc::new(RefCell::new(Inner {
                entries: vec![initial],
                index: 0,
                next_id: 0,
                listeners: vec![],
            })),
        }
    }

    /// Returns the URL currently shown in the address bar.
    ///
    pub fn location(&self) -> Url {
        let inner = self.inner.borrow();
        inner.entries[inner.index].clone()
    }

    /// Returns the recognized query parameters of the current URL.
    ///
    pub fn search_params(&self) -> SearchParams {
        SearchParams::from_url(&self.location())
    }

    /// Returns the raw query string of the current URL, without `?`.
    ///
    pub fn query(&self) -> String {
        self.location().query().unwrap_or_default().to_owned()
    }

    /// Open a new entry, discarding any forward entries.
    ///
    pub fn push(&self, url: Url) {
        let mut inner = self.inner.borrow_mut();
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(url);
        inner.index = keep;
        debug!("History pushed entry {} of {}.", inner.index + 1, inner.entries.len());
    }

    /// Overwrite the current entry.
    ///
    pub fn replace(&self, url: Url) {
        let mut inner = self.inner.borrow_mut();
        let index = inner.index;
        inner.entries[index] = url;
    }

    /// Replace the query string of the current entry with the given pairs.
    ///
    pub fn replace_query<'a, I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut url = self.location();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        self.replace(url);
    }

    /// Move one entry back. Returns false when already at the first entry.
    ///
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// Move one entry forward. Returns false when already at the last entry.
    ///
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    fn go(&self, delta: isize) -> bool {
        let (event, listeners) = {
            let mut inner = self.inner.borrow_mut();
            let target = inner.index as isize + delta;
            if target < 0 || target >= inner.entries.len() as isize {
                return false;
            }
            inner.index = target as usize;
            let event = NavigationEvent {
                url: inner.entries[inner.index].clone(),
            };
            let listeners = inner
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect::<Vec<_>>();
            (event, listeners)
        };
        debug!("History navigated to '{}'.", event.url);
        for listener in listeners {
            listener(&event);
        }
        true
    }

    /// Register a navigation listener.
    ///
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&NavigationEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a navigation listener. Returns false if it was not registered.
    ///
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn url(query: &str) -> Url {
        Url::parse(&format!("https://trip.example/group?{}", query)).unwrap()
    }

    #[test]
    fn back_and_forward_move_between_entries() {
        let history = History::new(url("page=1"));
        history.push(url("page=2"));
        history.push(url("page=3"));

        assert!(history.back());
        assert_eq!(history.query(), "page=2");
        assert!(history.back());
        assert!(!history.back());
        assert!(history.forward());
        assert_eq!(history.query(), "page=2");
    }

    #[test]
    fn push_discards_forward_entries() {
        let history = History::new(url("page=1"));
        history.push(url("page=2"));
        history.back();
        history.push(url("page=9"));
        assert_eq!(history.len(), 2);
        assert!(!history.forward());
    }

    #[test]
    fn only_navigation_notifies_listeners() {
        let history = History::new(url("page=1"));
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        history.subscribe(move |_| counter.set(counter.get() + 1));

        history.push(url("page=2"));
        history.replace(url("page=3"));
        assert_eq!(calls.get(), 0);

        history.back();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listener_may_write_back_during_navigation() {
        let history = History::new(url("page=1"));
        history.push(url("page=2"));
        let writer = history.clone();
        history.subscribe(move |_| writer.replace_query(vec![("page", "7")]));

        history.back();
        assert_eq!(history.query(), "page=7");
    }

    #[test]
    fn replace_query_encodes_values() {
        let history = History::new(url(""));
        history.replace_query(vec![("title", "제주 여행"), ("page", "1")]);
        let params = history.search_params();
        assert_eq!(params.get(crate::query::QueryKey::Title), Some("제주 여행"));
        assert_eq!(history.len(), 1);
    }
}
