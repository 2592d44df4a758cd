pub mod db;
pub mod homedir;
pub mod input;
pub mod profile;
