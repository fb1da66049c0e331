pub mod bins;
pub mod football;
pub mod geoip;
pub mod http;
pub mod trains;
pub mod weather;
