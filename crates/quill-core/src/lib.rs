pub mod config;
pub mod error;
pub mod i18n;
pub mod policy;
pub mod types;

pub use config::QuillConfig;
pub use error::{QuillError, Result};
pub use i18n::{TextBundle, TextLookup};
pub use policy::{
    char_count, TierPolicy, ANONYMOUS_CHAR_LIMIT, AUTHORIZED_CHAR_LIMIT, MAX_FREE_CORRECTIONS_PER_DAY,
    PREMIUM_CHAR_LIMIT,
};
pub use types::*;
