use axum::extract::{FromRequest, FromRequestParts, Request};
use garde::Validate;
use http::request::Parts;
use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

use crate::error::ApiError;

/// Extractor wrapper that runs garde validation on the extracted value.
///
/// Both the inner extractor's rejection and a failed validation are turned into
/// [`ApiError`], so malformed and invalid input share one response shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct Garde<E>(pub E);

impl<E> Deref for Garde<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<E> DerefMut for Garde<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<E: Display> Display for Garde<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<E> Garde<E> {
    pub fn into_inner(self) -> E {
        self.0
    }
}

impl<S, Extractor, T> FromRequest<S> for Garde<Extractor>
where
    S: Send + Sync,
    T: Validate<Context = ()>,
    Extractor: Deref<Target = T> + FromRequest<S>,
    ApiError: From<<Extractor as FromRequest<S>>::Rejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let inner = Extractor::from_request(req, state).await?;
        inner.deref().validate()?;
        Ok(Garde(inner))
    }
}

impl<S, Extractor, T> FromRequestParts<S> for Garde<Extractor>
where
    S: Send + Sync,
    T: Validate<Context = ()>,
    Extractor: Deref<Target = T> + FromRequestParts<S>,
    ApiError: From<<Extractor as FromRequestParts<S>>::Rejection>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let inner = Extractor::from_request_parts(parts, state).await?;
        inner.deref().validate()?;
        Ok(Garde(inner))
    }
}
