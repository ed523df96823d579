//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::products::{ProductCardView, category_slug};
use crate::state::AppState;

/// How many of the latest catalog entries count as "new this week".
const NEW_ARRIVALS: usize = 10;

/// A category band on the home page.
#[derive(Clone)]
pub struct CategorySectionView {
    pub title: String,
    pub slug: String,
    pub products: Vec<ProductCardView>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub newest: Vec<ProductCardView>,
    pub sections: Vec<CategorySectionView>,
}

/// Display the home page: the newest arrivals plus one band per
/// category, in catalog order.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let catalog = state.backend().products().await?;
    let base = &state.config().backend.base_url;

    let newest: Vec<ProductCardView> = catalog
        .iter()
        .rev()
        .take(NEW_ARRIVALS)
        .map(|p| ProductCardView::from_product(p, base))
        .collect();

    let mut sections: Vec<CategorySectionView> = Vec::new();
    for product in catalog.iter() {
        let Some(category) = product.category.as_deref() else {
            continue;
        };
        let card = ProductCardView::from_product(product, base);
        match sections.iter_mut().find(|s| s.title == category) {
            Some(section) => section.products.push(card),
            None => sections.push(CategorySectionView {
                title: category.to_owned(),
                slug: category_slug(category),
                products: vec![card],
            }),
        }
    }

    Ok(HomeTemplate { newest, sections })
}
