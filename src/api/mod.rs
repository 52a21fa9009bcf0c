//! REST API module
//!
//! HTTP host for the ledger. The caller of a request is named by the
//! `x-sender` header.
//!
//! # Endpoints
//!
//! ## Currency
//! - `GET /api/currency` - Currency metadata
//! - `POST /api/currency` - Create the currency
//! - `GET /api/audit` - Supply against the sum of balances
//!
//! ## Accounts
//! - `GET /api/accounts` - List registered accounts
//! - `POST /api/accounts` - Open an account for the sender
//! - `GET /api/accounts/{address}/balance` - Balance
//! - `GET /api/allowance?owner=..&spender=..` - Remaining allowance
//!
//! ## Transactions
//! - `POST /api/transfer`, `/api/approve`, `/api/transferFrom`
//! - `POST /api/increaseAllowance`, `/api/decreaseAllowance`
//! - `POST /api/mint`, `/api/burn`, `/api/burnFrom`
//! - `POST /api/call` - Any method as `{"method": .., "params": ..}`
//!
//! ## WebSocket
//! - `GET /ws` - Every call result as it is reported

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::{ApiNotifier, ApiState};
pub use routes::create_router;
pub use websocket::{WsBroadcaster, WsEvent};
