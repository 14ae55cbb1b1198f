// Analysis session — cached institution data and the last embedding.
//
// Loaded packages are cached by institution key for the life of the
// session and never invalidated. The cache sits behind a cloneable
// `PairLoader` so background recomputes can fill it too. The most recent
// embedding is kept so a search can restyle it without a recompute.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::analysis::filter::default_types;
use crate::config::{CompareConfig, CompareDefaults};
use crate::embedding::highlight::{highlight, StyleOverlay};
use crate::embedding::{EmbeddingMethod, EmbeddingResult};
use crate::error::LoadError;
use crate::pipeline::compare::ComparisonReport;
use crate::records::models::TermSource;
use crate::sources::loader::{InstitutionData, InstitutionLoader};
use crate::sources::traits::DatasetSource;

/// Every knob that affects a recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParams {
    pub a: String,
    pub b: String,
    pub year_min: i32,
    pub year_max: i32,
    pub per_capita: bool,
    pub full_time_only: bool,
    pub term_source: TermSource,
    /// Restrict to the default publication types.
    pub normalize_types: bool,
    pub method: EmbeddingMethod,
    pub seed: Option<u64>,
}

impl QueryParams {
    pub fn from_defaults(defaults: &CompareDefaults) -> Self {
        Self {
            a: defaults.a.clone(),
            b: defaults.b.clone(),
            year_min: defaults.year_min,
            year_max: defaults.year_max,
            per_capita: false,
            full_time_only: true,
            term_source: TermSource::Topics,
            normalize_types: true,
            method: EmbeddingMethod::Pca,
            seed: None,
        }
    }

    /// Same query with A and B exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            a: self.b.clone(),
            b: self.a.clone(),
            ..self.clone()
        }
    }

    /// The type filter for this query, if any.
    pub fn allowed_types(&self) -> Option<BTreeSet<String>> {
        self.normalize_types.then(default_types)
    }
}

/// Cloneable handle over the config, the loader and the shared package
/// cache. Recompute tasks take one of these so loading never blocks the
/// caller.
pub struct PairLoader<S: DatasetSource> {
    config: Arc<CompareConfig>,
    loader: Arc<InstitutionLoader<S>>,
    cache: Arc<Mutex<HashMap<String, Arc<InstitutionData>>>>,
}

impl<S: DatasetSource> Clone for PairLoader<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            loader: Arc::clone(&self.loader),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: DatasetSource> PairLoader<S> {
    pub fn new(config: CompareConfig, loader: InstitutionLoader<S>) -> Self {
        Self {
            config: Arc::new(config),
            loader: Arc::new(loader),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub async fn is_cached(&self, key: &str) -> bool {
        self.cache.lock().await.contains_key(key)
    }

    async fn fetch(&self, key: &str) -> Result<Arc<InstitutionData>, LoadError> {
        if let Some(data) = self.cache.lock().await.get(key) {
            debug!(institution = key, "Cache hit");
            return Ok(Arc::clone(data));
        }
        let institution = self
            .config
            .institution(key)
            .map_err(|_| LoadError::UnknownInstitution(key.to_string()))?;
        Ok(Arc::new(self.loader.load(key, institution).await?))
    }

    /// Both packages for `params`, loading whatever isn't cached yet
    /// concurrently. Nothing is cached unless both succeed.
    pub async fn load_pair(
        &self,
        params: &QueryParams,
    ) -> Result<(Arc<InstitutionData>, Arc<InstitutionData>), LoadError> {
        let (a, b) = if params.a == params.b {
            let data = self.fetch(&params.a).await?;
            (Arc::clone(&data), data)
        } else {
            tokio::try_join!(self.fetch(&params.a), self.fetch(&params.b))?
        };

        let mut cache = self.cache.lock().await;
        cache.entry(params.a.clone()).or_insert_with(|| Arc::clone(&a));
        cache.entry(params.b.clone()).or_insert_with(|| Arc::clone(&b));
        Ok((a, b))
    }

    /// Load (or reuse) both packages and run a full comparison on a
    /// blocking thread.
    pub async fn compare(&self, params: &QueryParams) -> anyhow::Result<ComparisonReport> {
        let (a, b) = self.load_pair(params).await?;
        let request = params.clone();
        let report =
            tokio::task::spawn_blocking(move || ComparisonReport::compute(&a, &b, &request)).await?;
        Ok(report)
    }
}

/// One user session: the shared loader plus the last computed embedding.
pub struct AnalysisSession<S: DatasetSource> {
    loader: PairLoader<S>,
    last_embedding: Option<EmbeddingResult>,
}

impl<S: DatasetSource> AnalysisSession<S> {
    pub fn new(config: CompareConfig, loader: InstitutionLoader<S>) -> Self {
        Self {
            loader: PairLoader::new(config, loader),
            last_embedding: None,
        }
    }

    pub fn config(&self) -> &CompareConfig {
        self.loader.config()
    }

    /// Starting parameters from the config's defaults.
    pub fn default_params(&self) -> QueryParams {
        QueryParams::from_defaults(&self.config().defaults)
    }

    /// A handle for loading and comparing off the session's own task.
    pub fn pair_loader(&self) -> PairLoader<S> {
        self.loader.clone()
    }

    pub async fn is_cached(&self, key: &str) -> bool {
        self.loader.is_cached(key).await
    }

    pub async fn load_pair(
        &self,
        params: &QueryParams,
    ) -> Result<(Arc<InstitutionData>, Arc<InstitutionData>), LoadError> {
        self.loader.load_pair(params).await
    }

    /// Run a full comparison and keep its embedding for later searches.
    pub async fn compare(&mut self, params: &QueryParams) -> anyhow::Result<ComparisonReport> {
        let report = self.loader.compare(params).await?;
        self.accept(&report);
        Ok(report)
    }

    /// Record a finished report's embedding as the one searches apply to.
    pub fn accept(&mut self, report: &ComparisonReport) {
        self.last_embedding = report.embedding.result().cloned();
    }

    pub fn last_embedding(&self) -> Option<&EmbeddingResult> {
        self.last_embedding.as_ref()
    }

    /// Highlight authors in the last embedding. `None` when nothing has
    /// been embedded yet.
    pub fn search(&self, query: &str) -> Option<StyleOverlay> {
        self.last_embedding.as_ref().map(|e| highlight(e, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> QueryParams {
        QueryParams::from_defaults(&CompareDefaults {
            a: "north".to_string(),
            b: "south".to_string(),
            year_min: 2021,
            year_max: 2025,
        })
    }

    #[test]
    fn swapped_exchanges_only_keys() {
        let mut p = params();
        p.per_capita = true;
        let s = p.swapped();
        assert_eq!(s.a, "south");
        assert_eq!(s.b, "north");
        assert!(s.per_capita);
        assert_eq!(s.swapped(), p);
    }

    #[test]
    fn type_filter_follows_flag() {
        let mut p = params();
        assert_eq!(p.allowed_types().map(|t| t.len()), Some(4));
        p.normalize_types = false;
        assert!(p.allowed_types().is_none());
    }
}
