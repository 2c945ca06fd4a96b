pub mod category;
pub mod movie;
pub mod movie_category;
