pub mod export;
pub mod scenes;
pub mod status;
pub mod steps;
pub mod verify;
