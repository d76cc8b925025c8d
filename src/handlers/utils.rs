// handlers/utils.rs - shared reply shapes

use serde_json::{json, Value};

use crate::database::UpdateOutcome;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Reply for a sparse update. A body with nothing recognized still
/// succeeds; a vanished row is 404.
pub fn update_reply(outcome: UpdateOutcome, what: &str) -> ApiResult<Value> {
    match outcome {
        UpdateOutcome::NoChanges => Ok(ApiResponse::success(json!({
            "message": "No changes",
            "updated": false,
        }))),
        UpdateOutcome::Updated(0) => Err(ApiError::not_found(format!("{} not found", what))),
        UpdateOutcome::Updated(_) => Ok(ApiResponse::success(json!({
            "message": format!("{} updated successfully", what),
            "updated": true,
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_still_succeeds() {
        let reply = update_reply(UpdateOutcome::NoChanges, "Video").unwrap();
        assert_eq!(reply.data["updated"], false);
    }

    #[test]
    fn update_of_missing_row_is_not_found() {
        let err = update_reply(UpdateOutcome::Updated(0), "Series").unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "Series not found");
    }
}
