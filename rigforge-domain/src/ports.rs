use rigforge_types::{CatalogItem, Category};

/// `limit` value that asks for the complete inventory of a category.
pub const ALL_CANDIDATES: usize = usize::MAX;

/// Ranked candidate source.
///
/// Implementations must return items of the requested category only, sorted by
/// descending `predicted_rating` for the given profile, and must not truncate before
/// sorting. With `limit == ALL_CANDIDATES` the whole category is returned; the engine
/// filters compatibility on that full list before choosing anything.
pub trait CandidateOracle {
    fn recommend(
        &self,
        profile_id: &str,
        category: Category,
        limit: usize,
    ) -> anyhow::Result<Vec<CatalogItem>>;
}

impl<T: CandidateOracle + ?Sized> CandidateOracle for &T {
    fn recommend(
        &self,
        profile_id: &str,
        category: Category,
        limit: usize,
    ) -> anyhow::Result<Vec<CatalogItem>> {
        (**self).recommend(profile_id, category, limit)
    }
}
