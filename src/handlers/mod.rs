pub mod detect;

pub use detect::{DetectError, IngredientDetector};
