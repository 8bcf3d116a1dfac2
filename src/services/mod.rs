pub mod daily;
pub mod dialogflow;
pub mod economy;
pub mod slots;
