pub mod autosave;
pub mod context;
pub mod lifecycle;
pub mod manager;
pub mod settings;
pub mod timers;

pub use autosave::Autosave;
pub use context::{FrameInfo, ScriptContext, domain_of};
pub use lifecycle::{ContentScript, ScriptState};
pub use manager::{DetectReason, FormManager};
pub use settings::Settings;
pub use timers::Debouncer;
