use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "UICMS Core";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn default_log_filter() -> String {
    "info,tower_http=debug".to_string()
}

/// Hub-and-spoke routing topology for inter-campus referrals.
///
/// A referral leaving a secondary campus for a different campus is
/// rerouted to the hub campus's General clinic. Referrals between
/// campuses outside the secondary set are left alone.
#[derive(Debug, Clone)]
pub struct RoutingTopology {
    pub hub_campus_id: i64,
    pub secondary_campus_ids: Vec<i64>,
}

impl RoutingTopology {
    pub fn is_secondary(&self, campus_id: i64) -> bool {
        self.secondary_campus_ids.contains(&campus_id)
    }
}

impl Default for RoutingTopology {
    /// Campus 1 is the main (hub) campus; 2 and 3 are the satellite
    /// campuses whose outbound inter-campus referrals funnel into it.
    fn default() -> Self {
        Self {
            hub_campus_id: 1,
            secondary_campus_ids: vec![2, 3],
        }
    }
}

/// Runtime configuration, read from the environment with local defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub routing: RoutingTopology,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("UICMS_BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let database_path = std::env::var("UICMS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uicms.db"));

        let jwt_secret =
            std::env::var("UICMS_JWT_SECRET").unwrap_or_else(|_| "dev-only-secret".to_string());

        let token_ttl = std::env::var("UICMS_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(8 * 60 * 60));

        let routing = RoutingTopology {
            hub_campus_id: std::env::var("UICMS_HUB_CAMPUS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            secondary_campus_ids: std::env::var("UICMS_SECONDARY_CAMPUSES")
                .map(|v| parse_id_list(&v))
                .unwrap_or_else(|_| vec![2, 3]),
        };

        Self {
            bind_addr,
            database_path,
            jwt_secret,
            token_ttl,
            routing,
        }
    }
}

fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topology_matches_campus_layout() {
        let topology = RoutingTopology::default();
        assert_eq!(topology.hub_campus_id, 1);
        assert!(topology.is_secondary(2));
        assert!(topology.is_secondary(3));
        assert!(!topology.is_secondary(1));
    }

    #[test]
    fn id_list_parses_with_whitespace() {
        assert_eq!(parse_id_list("2, 3 ,7"), vec![2, 3, 7]);
        assert_eq!(parse_id_list(""), Vec::<i64>::new());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
