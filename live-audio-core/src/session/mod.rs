pub mod live;
pub mod messages;
pub mod transcript;
