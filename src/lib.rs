// Module layout (Clean Architecture style)
// - bootstrap: configuration, wiring and seeding
// - infrastructure: DB/JWT/mail/Google adapters
// - presentation: HTTP handlers, envelope and routing
// - application: use cases, ports and cross-cutting policies
// - domain: core models
// - client: typed HTTP client for the API

pub mod application;
pub mod bootstrap;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

#[cfg(test)]
pub(crate) mod test_support;
