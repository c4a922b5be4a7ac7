// Catalog categories. The only endpoint that needs no token.

use reqwest::Method;

use crate::client::{Api, IemClient};
use crate::models::Category;
use crate::response::ApiResult;

impl IemClient {
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        let url = self.url(Api::Service, &["categories"])?;
        let builder = self.request(Method::GET, url, None)?;
        self.send(builder).await?.extract("Categories", "/data")
    }
}
