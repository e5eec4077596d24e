use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct About {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<&'static str>,
}

fn about() -> About {
    About {
        name: "Punocracy",
        version: env!("CARGO_PKG_VERSION"),
        description: "Submit puns, browse homophones and rate what everyone else came up with",
        endpoints: vec![
            "/ (public)",
            "/words[?letter=x|?word=w] (public)",
            "/submit (POST requires login)",
            "/history (login)",
            "/queuerater (login)",
            "/signup, /login, /logout (public)",
            "/users/:id (login, own account only)",
        ],
    }
}

/// GET /about
pub async fn get_about() -> ApiResult<About> {
    Ok(ApiResponse::success(about()))
}

/// POST /about - same page; forms on the site post back here
pub async fn post_about() -> ApiResult<About> {
    Ok(ApiResponse::success(about()))
}
