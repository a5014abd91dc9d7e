use bookshelf_dal::ListingParams;
use garde::Validate;

/// `skip`/`limit` query parameters shared by listing and search.
#[derive(Debug, Clone, Default, Validate, serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[garde(allow_unvalidated)]
pub struct Paging {
    skip: Option<u32>,
    limit: Option<u32>,
}

impl Paging {
    pub fn new(skip: Option<u32>, limit: Option<u32>) -> Self {
        Self { skip, limit }
    }

    /// Oversized limits are clamped to `max_limit` rather than rejected.
    pub fn into_listing_params(self, default_limit: u32, max_limit: u32) -> ListingParams {
        let offset = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(default_limit).min(max_limit);
        ListingParams::new(offset.into(), limit.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = Paging::default().into_listing_params(100, 1000);
        assert_eq!(params.offset, 0);
        assert_eq!(params.limit, 100);
    }

    #[test]
    fn test_explicit_values() {
        let params = Paging::new(Some(20), Some(10)).into_listing_params(100, 1000);
        assert_eq!(params.offset, 20);
        assert_eq!(params.limit, 10);
    }

    #[test]
    fn test_limit_clamped() {
        let params = Paging::new(None, Some(5000)).into_listing_params(100, 1000);
        assert_eq!(params.limit, 1000);

        let params = Paging::new(None, None).into_listing_params(2000, 1000);
        assert_eq!(params.limit, 1000);
    }
}
