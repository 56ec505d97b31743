pub mod configuration;
pub mod cors;
pub mod domain;
pub mod email_client;
pub mod routes;
pub mod startup;
pub mod subscriber_store;
pub mod telemetry;
