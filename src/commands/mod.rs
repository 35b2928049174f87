pub mod init_db;
pub mod search;
pub mod serve;
pub mod status;
