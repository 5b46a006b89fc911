pub mod deposit;
pub mod execution;
pub mod provisional;
pub mod quote;
pub mod reserved;
pub mod route;

pub use deposit::{DepositInstructions, DepositMethod, DepositRecord, DepositStatus};
pub use execution::{ExecutionRecord, ExecutionStatus};
pub use provisional::{ProvisionalQuote, QuoteType};
pub use quote::{EdgeQuote, SettlementMeta, VenueKind};
pub use reserved::{OtcReservationMeta, ReservedQuote};
pub use route::{Route, RouteStep};
