pub mod backups;
pub mod files;
pub mod init;
pub mod misc;
pub mod serve;
pub mod tenants;
