/// Outbound API clients.
///
/// Submodules:
/// - `scb`: Statistics Sweden PxWeb API client (table data + metadata).

pub mod scb;
