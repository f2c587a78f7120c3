pub mod ingredients;
pub mod label_source;
pub mod vision; // Google Cloud Vision label detection

pub use ingredients::extract_ingredient;
pub use label_source::LabelSource;
pub use vision::GoogleVisionClient;
