// Ward name lookup against the remote local-body directory.
//
// One directory fetch per district per run; everything after that is served
// from `DistrictCache`. Lookups never fail the caller: any problem is logged
// and the ward gets an empty name.
use crate::net::http_client;
use crate::types::LocalBody;
use crate::util::title_case;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_DIRECTORY_URL: &str = "https://careapi.coronasafe.in/api/v1/district";

static DISTRICT_IDS: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    [
        "Thiruvananthapuram",
        "Kollam",
        "Pathanamthitta",
        "Alappuzha",
        "Kottayam",
        "Idukki",
        "Ernakulam",
        "Thrissur",
        "Palakkad",
        "Malappuram",
        "Kozhikode",
        "Wayanad",
        "Kannur",
        "Kasaragod",
    ]
    .into_iter()
    .zip(1u8..)
    .collect()
});

pub fn district_id(district: &str) -> Option<u8> {
    DISTRICT_IDS.get(district.trim()).copied()
}

#[derive(Debug)]
pub enum ResolveError {
    UnknownDistrict(String),
    Fetch(String),
    /// The district's earlier fetch failed; it is not retried.
    Unavailable(u8),
    NoDivision(String),
    NoWard(u32),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownDistrict(d) => write!(f, "unknown district {:?}", d),
            ResolveError::Fetch(msg) => write!(f, "directory fetch failed: {}", msg),
            ResolveError::Unavailable(id) => {
                write!(f, "directory for district id {} unavailable this run", id)
            }
            ResolveError::NoDivision(name) => write!(f, "no local body starting with {:?}", name),
            ResolveError::NoWard(no) => write!(f, "no ward numbered {}", no),
        }
    }
}

impl Error for ResolveError {}

/// Where a district's local-body directory comes from.
pub trait DirectorySource {
    fn fetch(&mut self, district_id: u8) -> Result<Vec<LocalBody>, ResolveError>;
}

pub struct HttpDirectory {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpDirectory {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, district_id: u8) -> String {
        format!("{}/{}/get_all_local_body", self.base_url, district_id)
    }
}

impl DirectorySource for HttpDirectory {
    fn fetch(&mut self, district_id: u8) -> Result<Vec<LocalBody>, ResolveError> {
        let url = self.url_for(district_id);
        info!("fetching local body directory from {}", url);
        self.client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<Vec<LocalBody>>())
            .map_err(|e| ResolveError::Fetch(format!("GET {}: {}", url, e)))
    }
}

#[derive(Debug)]
pub enum CacheEntry {
    Loaded(Vec<LocalBody>),
    /// The fetch failed; the district is not asked again this run.
    Failed,
}

/// Directory payloads keyed by district id.
#[derive(Debug, Default)]
pub struct DistrictCache {
    entries: HashMap<u8, CacheEntry>,
}

impl DistrictCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, district_id: u8) -> bool {
        self.entries.contains_key(&district_id)
    }

    pub fn get(&self, district_id: u8) -> Option<&CacheEntry> {
        self.entries.get(&district_id)
    }

    pub fn insert(&mut self, district_id: u8, entry: CacheEntry) {
        self.entries.insert(district_id, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Anything that can name a ward. The aggregator only sees this seam.
pub trait WardNames {
    fn ward_name(&mut self, district: &str, division: &str, ward_no: u32) -> String;
}

pub struct WardNameResolver<S> {
    source: S,
    cache: DistrictCache,
    fetches: usize,
    failures: usize,
}

impl<S: DirectorySource> WardNameResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source, cache: DistrictCache::new(), fetches: 0, failures: 0 }
    }

    /// Remote fetches performed so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn cache(&self) -> &DistrictCache {
        &self.cache
    }

    fn directory(&mut self, district_id: u8) -> Result<&[LocalBody], ResolveError> {
        if !self.cache.contains(district_id) {
            self.fetches += 1;
            match self.source.fetch(district_id) {
                Ok(bodies) => {
                    debug!("cached {} local bodies for district id {}", bodies.len(), district_id);
                    self.cache.insert(district_id, CacheEntry::Loaded(bodies));
                }
                Err(e) => {
                    self.cache.insert(district_id, CacheEntry::Failed);
                    return Err(e);
                }
            }
        }
        match self.cache.get(district_id) {
            Some(CacheEntry::Loaded(bodies)) => Ok(bodies.as_slice()),
            _ => Err(ResolveError::Unavailable(district_id)),
        }
    }

    pub fn resolve(
        &mut self,
        district: &str,
        division: &str,
        ward_no: u32,
    ) -> Result<String, ResolveError> {
        let id = district_id(district)
            .ok_or_else(|| ResolveError::UnknownDistrict(district.to_string()))?;
        let bodies = self.directory(id)?;
        let body = bodies
            .iter()
            .find(|b| b.name.starts_with(division))
            .ok_or_else(|| ResolveError::NoDivision(division.to_string()))?;
        let ward = body
            .wards
            .iter()
            .find(|w| w.number == ward_no)
            .ok_or(ResolveError::NoWard(ward_no))?;
        Ok(title_case(&ward.name))
    }
}

impl<S: DirectorySource> WardNames for WardNameResolver<S> {
    fn ward_name(&mut self, district: &str, division: &str, ward_no: u32) -> String {
        match self.resolve(district, division, ward_no) {
            Ok(name) => name,
            Err(e) => {
                self.failures += 1;
                warn!(
                    "error getting ward name for district:{} lsg:{} wardNo:{}: {}",
                    district, division, ward_no, e
                );
                String::new()
            }
        }
    }
}
