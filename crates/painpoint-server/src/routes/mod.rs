pub mod health;
pub mod pain_points;
