//! Typed resource facades
//!
//! Each facade maps one method to one client call with a fixed verb and a
//! path relative to the Pétala base path (`/petalas/<slug>`).
//!
//! | Module | Paths | Description |
//! |--------|-------|-------------|
//! | `products` | `products[/...]` | Catalogue |
//! | `cart` | `cart[/...]` | Shopping cart of the signed-in customer |
//! | `orders` | `orders[/...]` | Orders, cancellation, tracking |
//! | `appointments` | `appointments[/...]` | Booking for service verticals |
//! | `customers` | `customers/me[/...]` | Profile, addresses, wishlist |
//! | `payment` | `payments/...` | Payment intents and refunds |
//! | `reviews` | `products/:id/reviews`, `reviews[/...]` | Product reviews |
//! | `analytics` | `analytics/...` | Event tracking and dashboard |
//! | `sofia` | `sofia/...` | Sofia assistant |

pub mod analytics;
pub mod appointments;
pub mod cart;
pub mod common;
pub mod customers;
pub mod orders;
pub mod payment;
pub mod products;
pub mod reviews;
pub mod sofia;

pub use analytics::AnalyticsApi;
pub use appointments::AppointmentsApi;
pub use cart::CartApi;
pub use common::{Ack, Address, ListParams, Paginated};
pub use customers::CustomersApi;
pub use orders::OrdersApi;
pub use payment::PaymentsApi;
pub use products::ProductsApi;
pub use reviews::ReviewsApi;
pub use sofia::SofiaApi;
