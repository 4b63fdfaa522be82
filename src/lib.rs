pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod routes;
pub mod signup_form;
pub mod startup;
pub mod subscription_store;
pub mod telemetry;
