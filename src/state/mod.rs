/// State management module
///
/// This module holds the application's data model:
/// - The loaded session, source file and compressed artifact (session.rs)
/// - Start-up settings read from the config directory (settings.rs)

pub mod session;
pub mod settings;

pub use session::{CompressedArtifact, Quality, Session, SessionId, SourceFile};
pub use settings::Settings;
