//! End-to-end scan scenarios against in-memory market data and alerts.

mod mock_market;
mod scan_flow;
