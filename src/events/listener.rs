use async_trait::async_trait;

use super::AuthEvent;

/// Handles authentication events asynchronously.
///
/// Implement to feed events into whatever the application cares about:
/// structured logs, metrics, an alerting channel.
///
/// ```rust,ignore
/// use latchkey::events::{AuthEvent, Listener};
/// use async_trait::async_trait;
///
/// struct PagerListener;
///
/// #[async_trait]
/// impl Listener for PagerListener {
///     async fn handle(&self, event: &AuthEvent) {
///         if let AuthEvent::AdminLoginFailed { username, .. } = event {
///             // page someone
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Called for every dispatched event; match on the variants you want.
    async fn handle(&self, event: &AuthEvent);
}
