//! List views: query state, local filtering and paging, and the controller
//! that ties them to remote fetches.

pub mod controller;
pub mod debounce;
pub mod filter;
pub mod paginate;
pub mod query;
pub mod session;
pub mod view;

pub use controller::{FetchTicket, ListController, ListSnapshot, ListStatus};
pub use debounce::DebouncedInput;
pub use filter::{ListItem, SupportLookup, evaluate};
pub use paginate::{PageResult, paginate, total_pages};
pub use query::{ALL, FilterSet, ListQuery};
pub use session::{EVENT_CHANNEL_CAPACITY, ListEvent, ListSession};
pub use view::{DEFAULT_PAGE_SIZE, FilterDimension, Paging, Placement, ViewConfig};
