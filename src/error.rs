use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Market {market} has {rows} rows, limit is {limit}")]
    TooManyRows {
        market: String,
        rows: usize,
        limit: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::TooManyRows { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Config(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_rows_maps_to_413() {
        let err = AppError::TooManyRows {
            market: "DAM".to_string(),
            rows: 10,
            limit: 5,
        };
        assert_eq!(err.to_string(), "Market DAM has 10 rows, limit is 5");
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn config_error_is_internal() {
        let resp = AppError::Config("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
