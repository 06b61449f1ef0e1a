pub mod capture;
pub mod dialogue;
pub mod driver;
pub mod parser;
pub mod session;
pub mod speech;
