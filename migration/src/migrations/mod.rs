pub mod m202510010001_create_quizzes;
pub mod m202510010002_create_episodes;
pub mod m202510010003_create_quiz_completions;
