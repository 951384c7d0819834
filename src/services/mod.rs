//! External collaborators: upstream bar feed, notifications, order routing.

pub mod kis;
pub mod market_data;
pub mod notifier;
pub mod orders;

pub use market_data::{BarPage, FetchCursor, PageRequest, UpstreamFetcher};
pub use notifier::{notify, DiscordNotifier, LogNotifier, Notifier};
pub use orders::{OrderConfirmation, OrderExecutor, OrderRequest, PaperOrderExecutor};
