pub mod encoder;
pub mod factorizer;
pub mod neighbors;
pub mod preprocess;
pub mod recommender;

pub use encoder::{HttpEncoder, QueryEncoder};
pub use factorizer::{HttpFactorizer, InteractionFactorizer};
pub use recommender::Recommender;
