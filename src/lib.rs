pub mod logger;
pub mod rawfile;
