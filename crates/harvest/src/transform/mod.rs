//! Record-level transforms applied between extraction and emission.

pub mod dedupe;
pub mod normalizer;
pub mod validator;

pub use dedupe::{strategy_for, DedupeStrategy, HashDedupe, UrlDedupe};
pub use normalizer::{DefaultNormalizer, Normalizer};
pub use validator::{RequiredFieldsValidator, ValidationResult, Validator};
