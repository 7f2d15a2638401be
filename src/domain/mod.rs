pub mod model;
pub mod renderer;
pub mod repository;
