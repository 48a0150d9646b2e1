use std::sync::Arc;

use crate::SharedGeometry;

/// Rendering-side owner of GPU resources.
///
/// The pool calls [`DeviceContext::dispose`] once for each geometry it retires
/// during [`crate::GeometryPool::sweep`]. The device decides when the
/// underlying buffers can actually be released.
pub trait DeviceContext: Send + Sync {
    fn dispose(&self, geometry: Arc<SharedGeometry>);
}

impl<F> DeviceContext for F
where
    F: Fn(Arc<SharedGeometry>) + Send + Sync,
{
    fn dispose(&self, geometry: Arc<SharedGeometry>) {
        self(geometry)
    }
}
