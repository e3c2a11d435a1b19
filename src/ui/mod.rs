// Terminal display surface
pub mod ticker;
