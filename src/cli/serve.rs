use clap::Args;
use std::net::SocketAddr;

/// Arguments for serve command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Marathon address (discovered through Consul when unset)
    #[arg(long, env = "PKGPLANE_MARATHON")]
    pub marathon: Option<String>,

    /// Marathon basic auth user
    #[arg(long, env = "PKGPLANE_MARATHON_USER")]
    pub marathon_user: Option<String>,

    /// Marathon basic auth password
    #[arg(long, env = "PKGPLANE_MARATHON_PASSWORD", hide_env_values = true)]
    pub marathon_password: Option<String>,

    /// Skip TLS certificate verification for Marathon
    #[arg(long, env = "PKGPLANE_MARATHON_NO_VERIFY_SSL")]
    pub marathon_no_verify_ssl: bool,

    /// Mesos leader address (discovered through Consul when unset)
    #[arg(long, env = "PKGPLANE_MESOS")]
    pub mesos: Option<String>,

    /// Mesos principal exposed to job templates
    #[arg(long, env = "PKGPLANE_MESOS_PRINCIPAL")]
    pub mesos_principal: Option<String>,

    /// Mesos secret exposed to job templates
    #[arg(long, env = "PKGPLANE_MESOS_SECRET", hide_env_values = true)]
    pub mesos_secret: Option<String>,

    /// ZooKeeper connection string (discovered through Consul when unset)
    #[arg(long, env = "PKGPLANE_ZOOKEEPER")]
    pub zookeeper: Option<String>,

    /// Address to serve the HTTP API on
    #[arg(long, env = "PKGPLANE_LISTEN", default_value = "0.0.0.0:4001")]
    pub listen: SocketAddr,

    /// Fetch and parse every package source at startup even if unchanged
    #[arg(long, env = "PKGPLANE_FORCE_SYNC")]
    pub force_sync: bool,
}
