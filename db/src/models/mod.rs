pub mod episode;
pub mod quiz;
pub mod quiz_completion;

pub use episode::Entity as Episode;
pub use quiz::Entity as Quiz;
pub use quiz_completion::Entity as QuizCompletion;
