pub mod error;
pub mod model;

pub use error::VocabularyError;
pub use model::{Language, LanguageView, Translation, User, Word, WordView};
