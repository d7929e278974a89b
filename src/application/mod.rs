// Application layer for exprkey: the comparer facade, hashed-container keys
// and corpus analysis.

pub mod config;

use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::expr::{Expr, ExprRef};
use crate::error::ExprError;
use crate::infrastructure::cache::IdentityCache;
use crate::infrastructure::pool::with_context;
use crate::ports::KeyComparer;

pub use config::ComparerConfig;

/// Structural equality and hashing of expression trees.
///
/// Comparisons and hash computations run on the calling thread's pooled
/// execution context. Root hashes are remembered by identity when caching is
/// enabled.
#[derive(Debug)]
pub struct ExpressionEqualityComparer {
    cache: IdentityCache,
}

impl ExpressionEqualityComparer {
    pub fn new(config: &ComparerConfig) -> Self {
        Self {
            cache: IdentityCache::new(config.cache_hash_codes, config.purge_threshold),
        }
    }

    /// Process-wide instance with the default configuration (caching on).
    pub fn shared() -> &'static Self {
        static SHARED: OnceLock<ExpressionEqualityComparer> = OnceLock::new();
        SHARED.get_or_init(|| Self::new(&ComparerConfig::default()))
    }

    /// Both absent is equal, exactly one absent is not.
    pub fn equals(&self, a: Option<&Expr>, b: Option<&Expr>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::eq(a, b) || are_equal(a, b),
            _ => false,
        }
    }

    pub fn hash_of(&self, root: Option<&ExprRef>) -> Result<u32, ExprError> {
        let root = root.ok_or(ExprError::NullArgument { name: "root" })?;
        Ok(self.hash_root(root))
    }

    pub fn hash_root(&self, root: &ExprRef) -> u32 {
        if let Some(hash) = self.cache.get(root) {
            return hash;
        }
        let hash = hash_expr(root);
        self.cache.insert(root, hash);
        hash
    }

    pub fn set_caching(&self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_enabled()
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// Hash `trees` in parallel and check each against its independently
    /// built twin at the same position. Trees without a twin count as
    /// unmatched and are reported through [`CorpusAnalysis::twins`].
    pub fn analyze_corpus(&self, trees: &[ExprRef], twins: &[ExprRef]) -> CorpusAnalysis {
        if trees.len() != twins.len() {
            warn!(trees = trees.len(), twins = twins.len(), "corpus and twin corpus differ in length");
        }
        let hashes: Vec<u32> = trees.par_iter().map(|t| self.hash_root(t)).collect();
        let twin_hashes: Vec<u32> = twins.par_iter().map(|t| self.hash_root(t)).collect();

        let (twins_equal, contract_violations) = trees
            .par_iter()
            .zip(twins.par_iter())
            .zip(hashes.par_iter().zip(twin_hashes.par_iter()))
            .map(|((a, b), (ha, hb))| {
                let equal = self.equals(Some(a), Some(b));
                (usize::from(equal), usize::from(equal && ha != hb))
            })
            .reduce(|| (0, 0), |x, y| (x.0 + y.0, x.1 + y.1));

        let distinct_hashes = hashes.iter().collect::<HashSet<_>>().len();
        let analysis = CorpusAnalysis {
            trees: trees.len(),
            twins: twins.len(),
            distinct_hashes,
            duplicate_hashes: trees.len() - distinct_hashes,
            twins_equal,
            contract_violations,
        };
        debug!(?analysis, "analyzed corpus");
        analysis
    }
}

impl Default for ExpressionEqualityComparer {
    fn default() -> Self {
        Self::new(&ComparerConfig::default())
    }
}

impl KeyComparer<ExprRef> for ExpressionEqualityComparer {
    fn eq_keys(&self, a: Option<&ExprRef>, b: Option<&ExprRef>) -> bool {
        self.equals(a.map(|a| &**a), b.map(|b| &**b))
    }

    fn hash_key(&self, key: Option<&ExprRef>) -> Result<u32, ExprError> {
        self.hash_of(key)
    }
}

/// Outcome of [`ExpressionEqualityComparer::analyze_corpus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusAnalysis {
    pub trees: usize,
    pub twins: usize,
    pub distinct_hashes: usize,
    pub duplicate_hashes: usize,
    pub twins_equal: usize,
    /// Twins that compared equal but hashed differently. Always 0 unless broken.
    pub contract_violations: usize,
}

impl CorpusAnalysis {
    pub fn duplicate_ratio(&self) -> f64 {
        if self.trees == 0 {
            0.0
        } else {
            self.duplicate_hashes as f64 / self.trees as f64
        }
    }
}

/// Tree usable as a `HashMap`/`HashSet` key with structural semantics,
/// through [`ExpressionEqualityComparer::shared`].
#[derive(Debug, Clone)]
pub struct ExprKey(ExprRef);

impl ExprKey {
    pub fn new(root: ExprRef) -> Self {
        ExprKey(root)
    }

    pub fn expr(&self) -> &ExprRef {
        &self.0
    }

    pub fn into_inner(self) -> ExprRef {
        self.0
    }
}

impl From<ExprRef> for ExprKey {
    fn from(root: ExprRef) -> Self {
        ExprKey(root)
    }
}

impl PartialEq for ExprKey {
    fn eq(&self, other: &Self) -> bool {
        ExpressionEqualityComparer::shared().equals(Some(&self.0), Some(&other.0))
    }
}

impl Eq for ExprKey {}

impl Hash for ExprKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(ExpressionEqualityComparer::shared().hash_root(&self.0));
    }
}

/// Uncached structural equality on the calling thread's pooled context.
pub fn are_equal(a: &Expr, b: &Expr) -> bool {
    with_context(|ctx| ctx.are_equal(a, b))
}

/// Uncached structural hash on the calling thread's pooled context.
pub fn hash_expr(root: &Expr) -> u32 {
    with_context(|ctx| ctx.hash(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::corpus;
    use crate::domain::expr::NodeType;
    use crate::domain::symbol::Sym;
    use std::collections::HashMap;

    fn sum() -> ExprRef {
        let int = Sym::named("System.Int32");
        Expr::binary(
            NodeType::Add,
            Expr::parameter(int.clone(), Some("x")),
            Expr::parameter(int.clone(), Some("y")),
            Some(int),
        )
        .unwrap()
    }

    #[test]
    fn test_null_handling() {
        let comparer = ExpressionEqualityComparer::default();
        let x = sum();
        assert!(comparer.equals(None, None));
        assert!(!comparer.equals(None, Some(&x)));
        assert!(!comparer.equals(Some(&x), None));
        assert!(matches!(
            comparer.hash_of(None),
            Err(ExprError::NullArgument { name: "root" })
        ));
    }

    #[test]
    fn test_cached_and_uncached_hashes_agree() {
        let comparer = ExpressionEqualityComparer::default();
        let x = sum();
        let cached = comparer.hash_of(Some(&x)).unwrap();
        assert_eq!(comparer.cache().len(), 1);
        assert_eq!(comparer.hash_of(Some(&x)).unwrap(), cached);

        comparer.set_caching(false);
        assert!(!comparer.is_caching());
        assert_eq!(comparer.hash_of(Some(&x)).unwrap(), cached);
        assert_eq!(hash_expr(&x), cached);
    }

    #[test]
    fn test_expr_key_in_hash_map() {
        let mut seen: HashMap<ExprKey, usize> = HashMap::new();
        *seen.entry(ExprKey::new(sum())).or_default() += 1;
        *seen.entry(ExprKey::new(sum())).or_default() += 1;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen.values().copied().next(), Some(2));
    }

    #[test]
    fn test_key_comparer_delegates() {
        let comparer = ExpressionEqualityComparer::default();
        let (a, b) = (sum(), sum());
        assert!(comparer.eq_keys(Some(&a), Some(&b)));
        assert_eq!(
            comparer.hash_key(Some(&a)).unwrap(),
            comparer.hash_key(Some(&b)).unwrap()
        );
    }

    #[test]
    fn test_analyze_reports_missing_twins() {
        let trees = corpus::corpus(10).unwrap();
        let twins = corpus::corpus(7).unwrap();
        let analysis = ExpressionEqualityComparer::default().analyze_corpus(&trees, &twins);
        assert_eq!(analysis.trees, 10);
        assert_eq!(analysis.twins, 7);
        assert_eq!(analysis.twins_equal, 7);
        assert_eq!(analysis.contract_violations, 0);
    }

    #[test]
    fn test_expr_key_hands_back_its_tree() {
        let tree = sum();
        let key = ExprKey::from(tree.clone());
        assert!(std::sync::Arc::ptr_eq(key.expr(), &tree));
        assert!(std::sync::Arc::ptr_eq(&key.into_inner(), &tree));
    }

    #[test]
    fn test_analyze_small_corpus() {
        let count = corpus::template_count() * 3;
        let trees = corpus::corpus(count).unwrap();
        let twins = corpus::corpus(count).unwrap();
        let analysis = ExpressionEqualityComparer::default().analyze_corpus(&trees, &twins);
        assert_eq!(analysis.trees, count);
        assert_eq!(analysis.twins, count);
        assert_eq!(analysis.twins_equal, count);
        assert_eq!(analysis.contract_violations, 0);
        assert!(analysis.duplicate_ratio() < 0.05);
    }
}
