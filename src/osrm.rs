//! Fills the catalog distance table from an OSRM server.
//!
//! Uses the blocking client; call it from a plain thread or
//! `spawn_blocking`, never directly on an async runtime.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::haversine::WALKING_LIMIT_MIN;
use crate::model::{Coordinates, Distance, TravelMode};
use crate::store::StoreError;
use crate::traits::DistanceSink;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("router answered '{code}' for profile {profile}")]
    Router { profile: String, code: String },
    #[error("router returned a {rows}x{cols} table for {expected} places")]
    Shape {
        rows: usize,
        cols: usize,
        expected: usize,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub walking_profile: String,
    pub driving_profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            walking_profile: "foot".to_string(),
            driving_profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Travel minutes and meters between every pair of requested points.
/// `None` where the router found no route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTable {
    pub minutes: Vec<Vec<Option<f64>>>,
    pub meters: Vec<Vec<Option<f64>>>,
}

impl RouteTable {
    fn leg(&self, from: usize, to: usize) -> Option<(f64, f64)> {
        let minutes = self.minutes.get(from)?.get(to).copied().flatten()?;
        let meters = self.meters.get(from)?.get(to).copied().flatten()?;
        Some((meters, minutes))
    }

    fn check(&self, expected: usize) -> Result<(), ImportError> {
        let ok = |rows: &Vec<Vec<Option<f64>>>| {
            rows.len() == expected && rows.iter().all(|row| row.len() == expected)
        };
        if ok(&self.minutes) && ok(&self.meters) {
            return Ok(());
        }
        Err(ImportError::Shape {
            rows: self.minutes.len(),
            cols: self.minutes.first().map_or(0, Vec::len),
            expected,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    #[serde(default)]
    durations: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    distances: Vec<Vec<Option<f64>>>,
}

impl TableResponse {
    fn into_table(self, profile: &str) -> Result<RouteTable, ImportError> {
        if self.code != "Ok" {
            return Err(ImportError::Router {
                profile: profile.to_string(),
                code: self.code,
            });
        }
        let minutes = self
            .durations
            .into_iter()
            .map(|row| row.into_iter().map(|secs| secs.map(|s| s / 60.0)).collect())
            .collect();
        Ok(RouteTable {
            minutes,
            meters: self.distances,
        })
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    /// Route table between all `points` for one routing profile.
    pub fn table(&self, profile: &str, points: &[Coordinates]) -> Result<RouteTable, ImportError> {
        if points.is_empty() {
            return Ok(RouteTable::default());
        }

        let coords = points
            .iter()
            .map(|point| format!("{:.6},{:.6}", point.lon, point.lat))
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/table/v1/{}/{}?annotations=duration,distance",
            self.config.base_url, profile, coords
        );

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<TableResponse>())?;
        let table = body.into_table(profile)?;
        table.check(points.len())?;
        Ok(table)
    }
}

/// Imports pairwise distances for catalog places into a distance sink.
pub struct DistanceImporter {
    client: OsrmClient,
    walking_limit_min: f64,
}

impl DistanceImporter {
    pub fn new(client: OsrmClient) -> Self {
        Self {
            client,
            walking_limit_min: WALKING_LIMIT_MIN,
        }
    }

    /// Route every pair of `places` and save the result. Returns the number
    /// of stored pairs.
    pub fn import<S: DistanceSink + ?Sized>(
        &self,
        places: &[(i64, Coordinates)],
        sink: &S,
    ) -> Result<usize, ImportError> {
        let points: Vec<Coordinates> = places.iter().map(|(_, point)| *point).collect();
        let config = self.client.config();
        let walking = self.client.table(&config.walking_profile, &points)?;
        let driving = self.client.table(&config.driving_profile, &points)?;

        let distances = pick_distances(places, &walking, &driving, self.walking_limit_min);
        sink.save_distances(&distances)?;
        info!(places = places.len(), pairs = distances.len(), "imported distances");
        Ok(distances.len())
    }
}

/// One distance per unordered pair: walking when it stays under the limit,
/// driving otherwise. Pairs with no usable route are skipped.
pub fn pick_distances(
    places: &[(i64, Coordinates)],
    walking: &RouteTable,
    driving: &RouteTable,
    walking_limit_min: f64,
) -> Vec<Distance> {
    let mut distances = Vec::new();
    for i in 0..places.len() {
        for j in i + 1..places.len() {
            let (a, b) = (places[i].0, places[j].0);
            let walk = walking.leg(i, j).filter(|(_, minutes)| *minutes < walking_limit_min);
            let picked = match walk {
                Some(leg) => Some((leg, TravelMode::Walking)),
                None => driving.leg(i, j).map(|leg| (leg, TravelMode::Car)),
            };
            let Some(((meters, minutes), mode)) = picked else {
                warn!(place_a = a, place_b = b, "no route between places");
                continue;
            };
            distances.push(Distance {
                place_a: a,
                place_b: b,
                meters,
                minutes,
                mode,
            });
        }
    }
    distances
}
