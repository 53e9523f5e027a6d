use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bearer token payload issued by the session service.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
