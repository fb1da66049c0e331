pub mod bins;
pub mod forecast;
pub mod location;
pub mod matches;
pub mod merge;
pub mod time;
pub mod transit;
