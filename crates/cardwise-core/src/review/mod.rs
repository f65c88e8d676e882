mod card;
mod grade;
mod state;

pub use card::Card;
pub use grade::QualityGrade;
pub use state::{CardReviewState, ReviewStatus, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR};
