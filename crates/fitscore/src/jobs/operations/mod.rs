mod score;
mod tailor;

pub use score::BatchScoreOperation;
pub use tailor::TailorOperation;
