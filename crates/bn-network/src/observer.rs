//! Link-creation observers.
//!
//! Network construction calls [`LinkObserver::on_link_created`] once for
//! every link right after it is materialized, handing over the link and
//! lockable handles to both endpoint nodes.  This is the extension point
//! elevation assignment hooks into.

use std::sync::Arc;

use crate::network::{Link, NodeRef};

/// Everything an observer learns about a freshly created link.
#[derive(Copy, Clone, Debug)]
pub struct LinkCreated<'a> {
    /// The link.  Its `id` is not assigned yet (`LinkId::INVALID`).
    pub link: &'a Link,
    pub from: NodeRef<'a>,
    pub to:   NodeRef<'a>,
    /// Tags of the OSM way the link was built from.
    pub tags: &'a [(String, String)],
}

/// Callback invoked during network construction.
///
/// # Thread safety
///
/// With the `parallel` feature the reader calls observers from every Rayon
/// worker at once, in no particular order.  Two concurrent events may share
/// an endpoint node; use [`NodeRef::lock`] for any read-modify-write of a
/// node position.
pub trait LinkObserver: Send + Sync {
    fn on_link_created(&self, event: &LinkCreated<'_>);
}

impl<O: LinkObserver + ?Sized> LinkObserver for &O {
    fn on_link_created(&self, event: &LinkCreated<'_>) {
        (**self).on_link_created(event)
    }
}

impl<O: LinkObserver + ?Sized> LinkObserver for Arc<O> {
    fn on_link_created(&self, event: &LinkCreated<'_>) {
        (**self).on_link_created(event)
    }
}

impl<O: LinkObserver + ?Sized> LinkObserver for Box<O> {
    fn on_link_created(&self, event: &LinkCreated<'_>) {
        (**self).on_link_created(event)
    }
}

/// A [`LinkObserver`] that does nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl LinkObserver for NoopObserver {
    fn on_link_created(&self, _event: &LinkCreated<'_>) {}
}

/// Adapter turning a closure into a [`LinkObserver`]; see [`from_fn`].
#[derive(Copy, Clone, Debug)]
pub struct FnObserver<F>(pub F);

impl<F> LinkObserver for FnObserver<F>
where
    F: Fn(&LinkCreated<'_>) + Send + Sync,
{
    fn on_link_created(&self, event: &LinkCreated<'_>) {
        (self.0)(event)
    }
}

/// Wrap a closure as a [`LinkObserver`].
///
/// ```rust,ignore
/// let seen = AtomicUsize::new(0);
/// let reader = OsmNetworkReader::builder()
///     .after_link_created(from_fn(|_| { seen.fetch_add(1, Ordering::Relaxed); }))
///     .build();
/// ```
pub fn from_fn<F>(f: F) -> FnObserver<F>
where
    F: Fn(&LinkCreated<'_>) + Send + Sync,
{
    FnObserver(f)
}
