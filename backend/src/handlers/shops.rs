//! Fixed shop and beverage lists

use axum::Json;
use serde::Serialize;
use shared::models::{Beverage, Shop};

#[derive(Serialize)]
pub struct ShopsResponse {
    pub shops: Vec<&'static str>,
    pub beverages: Vec<&'static str>,
}

pub async fn list_shops() -> Json<ShopsResponse> {
    Json(ShopsResponse {
        shops: Shop::ALL.iter().map(|s| s.name()).collect(),
        beverages: Beverage::ALL.iter().map(|b| b.name()).collect(),
    })
}
