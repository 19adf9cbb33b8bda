//! Delivery channels.

use futures::future::BoxFuture;

use super::error::DeliveryError;

/// A way of getting a notification to the operator.
///
/// Channels only know how to send. Choosing which channels to try, and in
/// what order, is up to the caller.
pub trait DeliveryChannel: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the channel has the credentials it needs.
    fn enabled(&self) -> bool;

    fn send<'a>(&'a self, title: &'a str, body: &'a str) -> BoxFuture<'a, Result<(), DeliveryError>>;
}
