mod health_test;
mod podcast_quiz;
