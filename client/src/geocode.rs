//! Geocode search turning free text into map locations.

use service::domain::Vertex;
use tracerr::Traced;
use tracing as log;

use crate::Error;

/// External geocode provider.
pub use common::Handler as Provider;

/// Free-text lookup of a geocode [`Provider`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Lookup(pub String);

/// Location matching a search query.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Human-readable address.
    pub address: String,

    /// Location on the map.
    pub location: Vertex,
}

/// Stateless proxy in front of a geocode [`Provider`].
#[derive(Clone, Debug)]
pub struct SearchProxy<P> {
    /// Wrapped [`Provider`].
    provider: P,

    /// Minimal number of characters in a query worth a lookup.
    min_query_len: usize,
}

impl<P> SearchProxy<P> {
    /// Default minimal number of characters in a query worth a lookup.
    pub const DEFAULT_MIN_QUERY_LEN: usize = 4;

    /// Creates a new [`SearchProxy`] in front of the provided [`Provider`].
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            min_query_len: Self::DEFAULT_MIN_QUERY_LEN,
        }
    }

    /// Overrides the minimal number of characters in a query worth a lookup.
    #[must_use]
    pub fn with_min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }

    /// Returns the wrapped [`Provider`].
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Looks up [`Candidate`]s for the provided `query`, in the order the
    /// [`Provider`] returns them.
    ///
    /// Too short queries are answered with nothing, without contacting the
    /// [`Provider`]. Failures of the [`Provider`] are logged and answered
    /// with nothing as well.
    pub async fn search(&self, query: &str) -> Vec<Candidate>
    where
        P: Provider<Lookup, Ok = Vec<Candidate>, Err = Traced<Error>>,
    {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            return Vec::new();
        }

        match self.provider.execute(Lookup(query.to_owned())).await {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("geocode search for `{query}` failed: {e}");
                Vec::new()
            }
        }
    }
}

/// Ticket of a single search, ordering concurrent responses.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Ticket(u64);

/// Search results shown to a user.
///
/// Every search is issued a [`Ticket`], and only the response to the newest
/// one is applied: a slow response to a superseded query is discarded.
#[derive(Clone, Debug, Default)]
pub struct SearchBox {
    /// Currently shown [`Candidate`]s.
    results: Vec<Candidate>,

    /// Last issued [`Ticket`] number.
    issued: u64,
}

impl SearchBox {
    /// Creates a new empty [`SearchBox`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently shown [`Candidate`]s.
    #[must_use]
    pub fn results(&self) -> &[Candidate] {
        &self.results
    }

    /// Registers a change of the query text.
    ///
    /// A blank `query` clears the results and returns [`None`]. Otherwise, a
    /// [`Ticket`] for the lookup is returned. Either way, all the previously
    /// issued [`Ticket`]s become stale.
    pub fn begin(&mut self, query: &str) -> Option<Ticket> {
        self.issued += 1;
        if query.trim().is_empty() {
            self.results.clear();
            return None;
        }
        Some(Ticket(self.issued))
    }

    /// Applies the `results` of the lookup issued with the provided
    /// [`Ticket`], unless it's stale.
    ///
    /// Returns whether the `results` were applied.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        results: Vec<Candidate>,
    ) -> bool {
        if ticket.0 != self.issued {
            log::debug!("discarding stale search results of {ticket:?}");
            return false;
        }
        self.results = results;
        true
    }

    /// Picks the shown [`Candidate`] at the provided `index`, clearing the
    /// results.
    ///
    /// Returns [`None`] and changes nothing if there is no such
    /// [`Candidate`].
    pub fn select(&mut self, index: usize) -> Option<Candidate> {
        if index >= self.results.len() {
            return None;
        }
        let picked = self.results.swap_remove(index);
        self.clear();
        Some(picked)
    }

    /// Clears the results, making all the issued [`Ticket`]s stale.
    pub fn clear(&mut self) {
        self.issued += 1;
        self.results.clear();
    }
}

#[cfg(test)]
mod spec {
    use std::cell::RefCell;

    use common::Handler;
    use service::domain::Vertex;
    use tracerr::Traced;

    use crate::Error;

    use super::{Candidate, Lookup, SearchBox, SearchProxy};

    fn candidate(address: &str, lat: f64, lng: f64) -> Candidate {
        Candidate {
            address: address.into(),
            location: Vertex::new(lat, lng).unwrap(),
        }
    }

    /// Provider recording lookups and answering with a fixed outcome.
    #[derive(Default)]
    struct Provider {
        lookups: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Handler<Lookup> for Provider {
        type Ok = Vec<Candidate>;
        type Err = Traced<Error>;

        async fn execute(
            &self,
            Lookup(query): Lookup,
        ) -> Result<Self::Ok, Self::Err> {
            self.lookups.borrow_mut().push(query);
            if self.fail {
                return Err(tracerr::new!(Error::Transient("503".into())));
            }
            Ok(vec![
                candidate("Dhaka, Bangladesh", 23.81, 90.41),
                candidate("Dhaka Division", 23.9, 90.3),
            ])
        }
    }

    #[tokio::test]
    async fn short_queries_never_reach_provider() {
        let proxy = SearchProxy::new(Provider::default());

        assert!(proxy.search("abc").await.is_empty());
        assert!(proxy.search("  ab ").await.is_empty());

        assert!(proxy.provider().lookups.borrow().is_empty());
    }

    #[tokio::test]
    async fn passes_results_through_in_order() {
        let proxy = SearchProxy::new(Provider::default());

        let found = proxy.search("Dhaka").await;

        assert_eq!(*proxy.provider().lookups.borrow(), ["Dhaka"]);
        assert_eq!(
            found.iter().map(|c| c.address.as_str()).collect::<Vec<_>>(),
            ["Dhaka, Bangladesh", "Dhaka Division"],
        );
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_nothing() {
        let proxy = SearchProxy::new(Provider {
            fail: true,
            ..Provider::default()
        });

        assert!(proxy.search("Khulna").await.is_empty());
        assert_eq!(proxy.provider().lookups.borrow().len(), 1);
    }

    #[test]
    fn discards_stale_responses() {
        let mut search = SearchBox::new();
        let slow = search.begin("Dhak").unwrap();
        let fast = search.begin("Dhaka").unwrap();

        assert!(search.complete(fast, vec![candidate("Dhaka", 23.8, 90.4)]));
        assert!(!search.complete(slow, vec![candidate("Dhak", 1.0, 1.0)]));

        assert_eq!(search.results(), [candidate("Dhaka", 23.8, 90.4)]);
    }

    #[test]
    fn blank_query_clears_and_invalidates() {
        let mut search = SearchBox::new();
        let ticket = search.begin("Dhaka").unwrap();
        assert!(search.complete(ticket, vec![candidate("Dhaka", 23.8, 90.4)]));

        let pending = search.begin("Khulna").unwrap();
        assert_eq!(search.begin("   "), None);
        assert!(search.results().is_empty());

        let late = vec![candidate("Khulna", 22.8, 89.5)];
        assert!(!search.complete(pending, late));
        assert!(search.results().is_empty());
    }

    #[test]
    fn selecting_clears_results() {
        let mut search = SearchBox::new();
        let ticket = search.begin("Dhaka").unwrap();
        _ = search.complete(
            ticket,
            vec![candidate("A", 1.0, 1.0), candidate("B", 2.0, 2.0)],
        );

        assert_eq!(search.select(5), None);
        assert_eq!(search.results().len(), 2);

        assert_eq!(search.select(1), Some(candidate("B", 2.0, 2.0)));
        assert!(search.results().is_empty());
    }
}
