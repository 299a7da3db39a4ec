mod order_aggregate;
mod portfolio;
mod position;
mod side;
mod trade;

pub use order_aggregate::OrderAggregate;
pub use portfolio::{PairSummary, PortfolioRollup};
pub use position::{Position, PositionType};
pub use side::{ParseSideError, Side};
pub use trade::{OrderId, Trade, TradeDefect, TradeId};
