//! Panel controllers for Quill.
//!
//! Each panel owns its own text, loading and error state and delegates the
//! real work to host-supplied collaborators. The access-tier gate from
//! `quill-core` runs before any collaborator is called.

pub mod collaborator;
pub mod dialog;
pub mod error;
pub mod grammar;
pub mod state;
pub mod subscription;
pub mod text_area;

pub use collaborator::{Clipboard, SubscriptionService, TextProcessor, Translator, UserPrompt};
pub use dialog::Dialog;
pub use error::{CollaboratorError, PanelError};
pub use grammar::{CorrectionTicket, GrammarPanel, Notice, TranslationTicket};
pub use state::{ActionOutcome, ActionState, ActionStateMachine, RequestToken};
pub use subscription::{SubscriptionPanel, SubscriptionTexts, SubscriptionView};
pub use text_area::{CopyFeedback, TextAreaControls, TextAreaView};
