//! JSON API for the donor directory and matcher.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! donor-match serve
//!
//! # Custom port, bind to all interfaces
//! donor-match serve --port 3000 --address 0.0.0.0
//!
//! # Persist submissions and enable the text service
//! donor-match --config donor-match.toml serve
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /api/health` - Liveness check
//! - `GET /api/donors` - List donors (`bloodType`, `location` filters)
//! - `POST /api/donors` - Register a donor (bearer token)
//! - `GET /api/requests` - List requests (`bloodType`, `location`, `urgency`, `sort`)
//! - `POST /api/requests` - Post a request (bearer token)
//! - `GET /api/hospitals` - List hospitals (`location`, `service` filters)
//! - `POST /api/match` - Rank compatible donors for a request
//! - `GET /api/digest` - Digest of open requests (`source`, `on_error`)
//!
//! Errors are returned as `{"error", "error_type", "details"}` with internal
//! details logged server-side only.

pub mod server;
