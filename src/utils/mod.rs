pub mod images;
pub mod password;
pub mod slug;
pub mod token;
