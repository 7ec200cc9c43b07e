//! Fetch Primitive
//!
//! The network seam. Hosts implement [`Fetcher`] over their real network
//! stack; decorators such as [`crate::CachingFetcher`] wrap another fetcher.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::{NetError, Request, Response};

/// Boxed, non-`Send` future; everything runs on one thread
pub type LocalFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Network fetch primitive
pub trait Fetcher {
    fn fetch<'a>(&'a self, request: &'a Request) -> LocalFuture<'a, Result<Response, NetError>>;
}

impl<F: Fetcher + ?Sized> Fetcher for Rc<F> {
    fn fetch<'a>(&'a self, request: &'a Request) -> LocalFuture<'a, Result<Response, NetError>> {
        (**self).fetch(request)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch<'a>(&'a self, request: &'a Request) -> LocalFuture<'a, Result<Response, NetError>> {
        (**self).fetch(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Echo {
        calls: Cell<usize>,
    }

    impl Fetcher for Echo {
        fn fetch<'a>(&'a self, request: &'a Request) -> LocalFuture<'a, Result<Response, NetError>> {
            Box::pin(async move {
                self.calls.set(self.calls.get() + 1);
                Ok(Response::ok_with("text/plain", request.url.clone()))
            })
        }
    }

    #[test]
    fn test_rc_delegates() {
        let echo = Rc::new(Echo { calls: Cell::new(0) });
        let shared: Rc<dyn Fetcher> = echo.clone();

        let response = smol::block_on(shared.fetch(&Request::get("/x"))).unwrap();
        assert_eq!(response.body, b"/x");
        assert_eq!(echo.calls.get(), 1);
    }
}
