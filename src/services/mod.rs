//! Adapters for the external collaborators: frame decoding, the facial-emotion
//! classifier, the chat LLM, and translation.

pub mod classifier;
pub mod frame;
pub mod llm;
pub mod translate;

pub use classifier::{Classification, Classifier, DisabledClassifier, HttpClassifier};
pub use frame::{decode_frame, Frame};
pub use translate::{HttpTranslator, Inbound, PassThroughTranslator, Translator};
