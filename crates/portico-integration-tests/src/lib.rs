//! End-to-end integration tests for Portico
//!
//! These tests assemble the gateway the way the server binary does:
//! HTTP directory client behind the TTL cache, edge middleware, shared
//! middleware, health router, and the renderer proxy, with wiremock
//! standing in for both the tenant directory service and the rendering
//! upstream.
