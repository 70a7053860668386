//! Cert Orchestrator Core Library
//!
//! A small declarative runtime and the component it evaluates:
//! - [`Output`]: deferred, memoised values composed with combinators
//! - [`Engine`]: resource registration, state comparison and the deployment summary
//! - [`StateStore`]: persisted resource state (in memory or a JSON file)
//! - [`DnsValidatedCertificate`]: request a certificate, publish its DNS
//!   validation records through a [`DnsAdapter`](cert_orchestrator_provider::DnsAdapter),
//!   wait for validation and expose the ARN
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use cert_orchestrator_core::{
//!     DnsValidatedCertificate, DnsValidatedCertificateArgs, Engine, ResourceOptions,
//! };
//! use cert_orchestrator_provider::{InMemoryCertificateManager, InMemoryDnsAdapter};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> cert_orchestrator_core::CoreResult<()> {
//! let engine = Engine::builder("site", "dev")
//!     .certificate_manager(Arc::new(InMemoryCertificateManager::new()))
//!     .build();
//!
//! let cert = DnsValidatedCertificate::new(
//!     &engine,
//!     "site",
//!     DnsValidatedCertificateArgs::new("example.com", Arc::new(InMemoryDnsAdapter::new()))
//!         .alternative_names(vec!["www.example.com".to_string()]),
//!     ResourceOptions::new(),
//! )?;
//!
//! let summary = engine.finish().await;
//! assert!(summary.is_success());
//! println!("{}", cert.arn().resolve().await?);
//! # Ok(())
//! # }
//! ```

pub mod components;
pub mod engine;
pub mod error;
pub mod output;
pub mod resource;
pub mod state;

// Re-export common types
pub use components::{DnsValidatedCertificate, DnsValidatedCertificateArgs};
pub use engine::{DeploymentSummary, Engine, EngineBuilder, ResourceFailure, ResourceStep, StepOp};
pub use error::{CoreError, CoreResult};
pub use output::Output;
pub use resource::{CreateContext, Resource, ResourceOptions, Urn};
pub use state::{InMemoryStateStore, JsonFileStateStore, ResourceState, StateStore};
