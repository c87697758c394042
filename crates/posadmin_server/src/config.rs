//! Command-line configuration for `posadmin-server`.

use clap::Parser;
use posadmin_core::{default_log_level, AdminSeed};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "posadmin-server", version, about = "Identity administration REST server")]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[arg(long, default_value = "127.0.0.1:5050")]
    pub bind: SocketAddr,

    /// SQLite database file; created and migrated on first start.
    #[arg(long, default_value = "posadmin.sqlite3")]
    pub database: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logs go to stderr when omitted.
    #[arg(long)]
    pub log_dir: Option<String>,

    /// User name of the initial SuperAdmin account.
    #[arg(long, requires = "admin_email")]
    pub admin_user_name: Option<String>,

    #[arg(long, requires = "admin_user_name")]
    pub admin_email: Option<String>,
}

impl ServerConfig {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn admin_seed(&self) -> Option<AdminSeed> {
        match (&self.admin_user_name, &self.admin_email) {
            (Some(user_name), Some(email)) => Some(AdminSeed {
                user_name: user_name.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }
}
