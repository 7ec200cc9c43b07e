//! Caching Fetcher
//!
//! A [`Fetcher`] decorator that answers eligible API reads from the
//! [`CacheStore`] and records qualifying responses on the way back.

use std::cell::RefCell;

use crate::{
    CachePolicy, CacheStats, CacheStore, Fetcher, LocalFuture, NetError, Request, Response,
    WriteOutcome,
};

/// Transparent caching proxy in front of another fetcher
pub struct CachingFetcher<F> {
    inner: F,
    store: RefCell<CacheStore>,
    policy: CachePolicy,
}

impl<F: Fetcher> CachingFetcher<F> {
    pub fn new(inner: F, store: CacheStore, policy: CachePolicy) -> Self {
        Self {
            inner,
            store: RefCell::new(store),
            policy,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Remove every cached response
    pub fn clear(&self) -> usize {
        self.store.borrow_mut().clear()
    }

    /// Sweep expired entries
    pub fn cleanup(&self) -> usize {
        self.store.borrow_mut().cleanup()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.borrow().stats()
    }

    async fn fetch_through(&self, request: &Request) -> Result<Response, NetError> {
        if !self.policy.allows_request(request) {
            return self.inner.fetch(request).await;
        }

        let key = CacheStore::request_key(request);
        let cached = self.store.borrow_mut().get(&key);
        if let Some(entry) = cached {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(entry.to_response());
        }

        tracing::debug!(url = %request.url, "cache miss");
        let response = self.inner.fetch(request).await?;

        if self.policy.allows_response(&response) {
            if let Ok(text) = response.text() {
                let content_type = response.content_type().unwrap_or("application/json");
                let outcome = self.store.borrow_mut().put(&key, text, content_type);
                if outcome == WriteOutcome::Dropped {
                    tracing::debug!(url = %request.url, "response not cached");
                }
            }
        }
        Ok(response)
    }
}

impl<F: Fetcher> Fetcher for CachingFetcher<F> {
    fn fetch<'a>(&'a self, request: &'a Request) -> LocalFuture<'a, Result<Response, NetError>> {
        Box::pin(self.fetch_through(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, MemoryStorage, Method};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Origin {
        hits: Cell<usize>,
        response: Response,
    }

    impl Origin {
        fn json() -> Self {
            Self {
                hits: Cell::new(0),
                response: Response::ok_with("application/json", r#"{"items":[]}"#),
            }
        }
    }

    impl Fetcher for Origin {
        fn fetch<'a>(&'a self, _request: &'a Request) -> LocalFuture<'a, Result<Response, NetError>> {
            self.hits.set(self.hits.get() + 1);
            let response = self.response.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    fn caching(origin: Origin) -> CachingFetcher<Origin> {
        let clock = Rc::new(ManualClock::new(0));
        let store = CacheStore::new(MemoryStorage::default(), clock);
        CachingFetcher::new(origin, store, CachePolicy::default())
    }

    #[test]
    fn test_second_read_served_from_cache() {
        let fetcher = caching(Origin::json());
        let request = Request::get("https://shop.test/api/v2/items");

        let first = smol::block_on(fetcher.fetch(&request)).unwrap();
        let second = smol::block_on(fetcher.fetch(&request)).unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(second.body, first.body);
        assert_eq!(fetcher.inner().hits.get(), 1);
    }

    #[test]
    fn test_ineligible_passes_through() {
        let fetcher = caching(Origin::json());
        let request = Request::get("https://shop.test/api/login");

        smol::block_on(fetcher.fetch(&request)).unwrap();
        smol::block_on(fetcher.fetch(&request)).unwrap();
        assert_eq!(fetcher.inner().hits.get(), 2);
        assert_eq!(fetcher.stats().entry_count, 0);
    }

    #[test]
    fn test_writes_never_cached() {
        let fetcher = caching(Origin::json());
        let request = Request::get("https://shop.test/api/cart").with_method(Method::Put);

        smol::block_on(fetcher.fetch(&request)).unwrap();
        assert_eq!(fetcher.stats().entry_count, 0);
    }

    #[test]
    fn test_html_response_not_stored() {
        let origin = Origin {
            hits: Cell::new(0),
            response: Response::ok_with("text/html", "<html></html>"),
        };
        let fetcher = caching(origin);

        smol::block_on(fetcher.fetch(&Request::get("/api/page"))).unwrap();
        assert_eq!(fetcher.stats().entry_count, 0);
    }

    #[test]
    fn test_error_status_returned_uncached() {
        let origin = Origin {
            hits: Cell::new(0),
            response: Response::status(503),
        };
        let fetcher = caching(origin);

        let response = smol::block_on(fetcher.fetch(&Request::get("/api/items"))).unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(fetcher.stats().entry_count, 0);
    }

    #[test]
    fn test_clear() {
        let fetcher = caching(Origin::json());
        smol::block_on(fetcher.fetch(&Request::get("/api/a"))).unwrap();
        smol::block_on(fetcher.fetch(&Request::get("/api/b"))).unwrap();

        assert_eq!(fetcher.clear(), 2);
        assert_eq!(fetcher.stats().entry_count, 0);
    }
}
