//! Process-wide cache of the built road graph.
//!
//! Building a graph is the only expensive step of a query, so the last built
//! graph is kept together with its spatial index. The cache holds a single
//! area; asking for a different bounding box replaces it.

use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicUsize, Ordering},
};

use log::{debug, info};
use parking_lot::RwLock;

use super::{RouterConfig, create_geo_graph};
use crate::{
    BoundingBox, Error, Facility, GeoGraph, NearestNodeIndex, RawNetwork,
    routing::{PathResult, RouteSelector, SelectorOptions},
    spatial::DEFAULT_LINEAR_SCAN_THRESHOLD,
};

static GLOBAL_CACHE: OnceLock<GraphCache> = OnceLock::new();

/// A built graph, its index and the area it was built for
#[derive(Debug)]
pub struct CachedNetwork {
    pub bbox: BoundingBox,
    pub graph: Arc<GeoGraph>,
    pub index: Arc<NearestNodeIndex>,
}

impl CachedNetwork {
    pub fn selector(&self, options: SelectorOptions) -> RouteSelector {
        RouteSelector::with_index(Arc::clone(&self.graph), Arc::clone(&self.index))
            .with_options(options)
    }
}

#[derive(Debug)]
pub struct GraphCache {
    slot: RwLock<Option<Arc<CachedNetwork>>>,
    linear_scan_threshold: usize,
    builds: AtomicUsize,
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new(DEFAULT_LINEAR_SCAN_THRESHOLD)
    }
}

impl GraphCache {
    pub fn new(linear_scan_threshold: usize) -> Self {
        Self {
            slot: RwLock::new(None),
            linear_scan_threshold,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.linear_scan_threshold)
    }

    /// The process-wide cache used by hosts that serve many queries
    pub fn global() -> &'static GraphCache {
        GLOBAL_CACHE.get_or_init(GraphCache::default)
    }

    /// Returns the cached network for `bbox`, or loads and builds it.
    ///
    /// `loader` is only called on a miss and runs without holding the cache
    /// lock, so readers keep seeing the previous network during a rebuild.
    /// A failed load or build leaves the previously cached network in place.
    pub fn get_or_build<F>(&self, bbox: BoundingBox, loader: F) -> Result<Arc<CachedNetwork>, Error>
    where
        F: FnOnce(&BoundingBox) -> Result<RawNetwork, Error>,
    {
        if let Some(cached) = self.lookup(&bbox) {
            debug!("Graph cache hit for {bbox:?}");
            return Ok(cached);
        }

        info!("Graph cache miss for {bbox:?}, rebuilding");
        let network = loader(&bbox)?;
        let graph = create_geo_graph(&network)?;
        let index = NearestNodeIndex::with_threshold(&graph, self.linear_scan_threshold);
        let built = Arc::new(CachedNetwork {
            bbox,
            graph: Arc::new(graph),
            index: Arc::new(index),
        });

        let mut slot = self.slot.write();
        // Another caller may have stored the same area while we were building
        if let Some(cached) = slot.as_ref().filter(|cached| cached.bbox == bbox) {
            return Ok(Arc::clone(cached));
        }
        *slot = Some(Arc::clone(&built));
        self.builds.fetch_add(1, Ordering::Relaxed);
        Ok(built)
    }

    /// Routes from `(lat, lon)` to the nearest facility on the network
    /// extract around the origin and `facilities`, building it on a miss.
    ///
    /// # Errors
    ///
    /// Everything [`RouterConfig::query_bbox`], the loader and
    /// [`RouteSelector::find_nearest_facility`] can fail with.
    pub fn find_nearest_facility<F>(
        &self,
        config: &RouterConfig,
        lat: f64,
        lon: f64,
        facilities: &[Facility],
        loader: F,
    ) -> Result<PathResult, Error>
    where
        F: FnOnce(&BoundingBox) -> Result<RawNetwork, Error>,
    {
        let bbox = config.query_bbox(lat, lon, facilities)?;
        let network = self.get_or_build(bbox, loader)?;
        network
            .selector(config.selector_options())
            .find_nearest_facility(lat, lon, facilities)
    }

    fn lookup(&self, bbox: &BoundingBox) -> Option<Arc<CachedNetwork>> {
        self.slot
            .read()
            .as_ref()
            .filter(|cached| cached.bbox == *bbox)
            .map(Arc::clone)
    }

    pub fn current(&self) -> Option<Arc<CachedNetwork>> {
        self.slot.read().clone()
    }

    pub fn invalidate(&self) {
        if self.slot.write().take().is_some() {
            info!("Graph cache invalidated");
        }
    }

    /// Number of graphs built by this cache so far
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}
